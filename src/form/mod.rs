//! Form input state: the three clinical fields, their edit buffers and
//! advisory bounds.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Systolic,
    Diastolic,
    Age,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Systolic, Field::Diastolic, Field::Age];

    pub fn label(self) -> &'static str {
        match self {
            Field::Systolic => "Pressão Sistólica (mmHg)",
            Field::Diastolic => "Pressão Diastólica (mmHg)",
            Field::Age => "Idade",
        }
    }

    /// Advisory (min, max) bounds. Never enforced before submission.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Field::Systolic => (80.0, 200.0),
            Field::Diastolic => (50.0, 130.0),
            Field::Age => (0.0, 120.0),
        }
    }

    pub fn in_range(self, value: f64) -> bool {
        let (min, max) = self.bounds();
        value >= min && value <= max
    }
}

/// Values sent to the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormInput {
    pub systolic: f64,
    pub diastolic: f64,
    pub age: f64,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            systolic: 120.0,
            diastolic: 80.0,
            age: 30.0,
        }
    }
}

impl FormInput {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Systolic => self.systolic,
            Field::Diastolic => self.diastolic,
            Field::Age => self.age,
        }
    }

    /// Accepts any value; out-of-range input is only flagged, never clamped.
    pub fn set(&mut self, field: Field, value: f64) {
        match field {
            Field::Systolic => self.systolic = value,
            Field::Diastolic => self.diastolic = value,
            Field::Age => self.age = value,
        }
    }

    pub fn out_of_range(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !f.in_range(self.get(*f)))
            .collect()
    }
}

/// Which control has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(Field),
    Submit,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Field(Field::Systolic) => Focus::Field(Field::Diastolic),
            Focus::Field(Field::Diastolic) => Focus::Field(Field::Age),
            Focus::Field(Field::Age) => Focus::Submit,
            Focus::Submit => Focus::Field(Field::Systolic),
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Field(Field::Systolic) => Focus::Submit,
            Focus::Field(Field::Diastolic) => Focus::Field(Field::Systolic),
            Focus::Field(Field::Age) => Focus::Field(Field::Diastolic),
            Focus::Submit => Focus::Field(Field::Age),
        }
    }
}

/// Input state holder: current values plus the text the user is typing.
#[derive(Debug, Clone)]
pub struct FormState {
    pub input: FormInput,
    pub focus: Focus,
    buffers: [String; 3],
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(FormInput::default())
    }
}

impl FormState {
    pub fn new(input: FormInput) -> Self {
        let buffers = Field::ALL.map(|f| format_value(input.get(f)));
        Self {
            input,
            focus: Focus::Field(Field::Systolic),
            buffers,
        }
    }

    pub fn buffer(&self, field: Field) -> &str {
        &self.buffers[index(field)]
    }

    /// Append a typed character to the focused field.
    /// Returns false when the character is not accepted.
    pub fn push_char(&mut self, c: char) -> bool {
        let Focus::Field(field) = self.focus else {
            return false;
        };
        let buf = &mut self.buffers[index(field)];

        let accepted = match c {
            '0'..='9' => true,
            '.' => !buf.contains('.'),
            '-' => buf.is_empty(),
            _ => false,
        };
        if accepted {
            buf.push(c);
            self.sync(field);
        }
        accepted
    }

    pub fn backspace(&mut self) {
        if let Focus::Field(field) = self.focus {
            self.buffers[index(field)].pop();
            self.sync(field);
        }
    }

    /// Set a field directly (also rewrites its buffer).
    #[cfg(test)]
    pub fn set(&mut self, field: Field, value: f64) {
        self.input.set(field, value);
        self.buffers[index(field)] = format_value(value);
    }

    pub fn reset(&mut self) {
        let focus = self.focus;
        *self = Self::new(FormInput::default());
        self.focus = focus;
    }

    // Empty or partial text ("-", ".") reads as zero.
    fn sync(&mut self, field: Field) {
        let value = self.buffers[index(field)].parse::<f64>().unwrap_or(0.0);
        self.input.set(field, value);
    }
}

fn index(field: Field) -> usize {
    match field {
        Field::Systolic => 0,
        Field::Diastolic => 1,
        Field::Age => 2,
    }
}

/// Render a number the way a form would show it (`120`, not `120.0`)
pub fn format_value(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let form = FormState::default();
        assert_eq!(form.input.systolic, 120.0);
        assert_eq!(form.input.diastolic, 80.0);
        assert_eq!(form.input.age, 30.0);
        assert_eq!(form.buffer(Field::Systolic), "120");
        assert_eq!(form.buffer(Field::Diastolic), "80");
        assert_eq!(form.buffer(Field::Age), "30");
        assert_eq!(form.focus, Focus::Field(Field::Systolic));
    }

    #[test]
    fn test_set_accepts_out_of_range() {
        let mut input = FormInput::default();
        input.set(Field::Systolic, 250.0);
        input.set(Field::Age, -4.0);
        assert_eq!(input.systolic, 250.0);
        assert_eq!(input.age, -4.0);
        assert_eq!(input.out_of_range(), vec![Field::Systolic, Field::Age]);
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(FormInput::default()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "systolic": 120.0, "diastolic": 80.0, "age": 30.0 })
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(Field::Systolic.in_range(80.0));
        assert!(Field::Systolic.in_range(200.0));
        assert!(!Field::Systolic.in_range(79.9));
        assert!(Field::Diastolic.in_range(130.0));
        assert!(!Field::Diastolic.in_range(131.0));
        assert!(Field::Age.in_range(0.0));
        assert!(!Field::Age.in_range(121.0));
        assert!(FormInput::default().out_of_range().is_empty());
    }

    #[test]
    fn test_typing_updates_value() {
        let mut form = FormState::default();
        form.backspace();
        form.backspace();
        form.backspace();
        assert_eq!(form.buffer(Field::Systolic), "");
        assert_eq!(form.input.systolic, 0.0);

        for c in "145".chars() {
            assert!(form.push_char(c));
        }
        assert_eq!(form.input.systolic, 145.0);

        // letters are rejected
        assert!(!form.push_char('x'));
        assert_eq!(form.buffer(Field::Systolic), "145");
    }

    #[test]
    fn test_sign_and_decimal_rules() {
        let mut form = FormState::default();
        form.focus = Focus::Field(Field::Age);
        form.set(Field::Age, 0.0);
        form.backspace();

        assert!(form.push_char('-'));
        assert_eq!(form.input.age, 0.0);
        assert!(!form.push_char('-'));
        assert!(form.push_char('2'));
        assert!(form.push_char('.'));
        assert!(!form.push_char('.'));
        assert!(form.push_char('5'));
        assert_eq!(form.input.age, -2.5);
    }

    #[test]
    fn test_typing_on_submit_is_ignored() {
        let mut form = FormState::default();
        form.focus = Focus::Submit;
        assert!(!form.push_char('1'));
        form.backspace();
        assert_eq!(form.input, FormInput::default());
    }

    #[test]
    fn test_focus_cycle() {
        let mut focus = Focus::Field(Field::Systolic);
        for _ in 0..4 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Field(Field::Systolic));
        assert_eq!(focus.prev(), Focus::Submit);
    }

    #[test]
    fn test_reset_keeps_focus() {
        let mut form = FormState::default();
        form.focus = Focus::Field(Field::Age);
        form.set(Field::Age, 99.0);
        form.reset();
        assert_eq!(form.input, FormInput::default());
        assert_eq!(form.buffer(Field::Age), "30");
        assert_eq!(form.focus, Focus::Field(Field::Age));
    }
}
