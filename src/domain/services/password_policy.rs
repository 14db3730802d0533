/// Individual requirements, mirroring the checklist shown next to password fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordChecks {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
    pub special: bool,
}

impl PasswordChecks {
    pub fn evaluate(password: &str) -> Self {
        Self {
            length: password.chars().count() >= 8,
            uppercase: password.chars().any(char::is_uppercase),
            lowercase: password.chars().any(char::is_lowercase),
            digit: password.chars().any(|c| c.is_ascii_digit()),
            special: password.chars().any(|c| !c.is_alphanumeric()),
        }
    }

    pub fn all_met(&self) -> bool {
        self.length && self.uppercase && self.lowercase && self.digit && self.special
    }
}

pub fn is_strong_password(password: &str) -> bool {
    PasswordChecks::evaluate(password).all_met()
}
