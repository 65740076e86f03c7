//! Mint vs. edit mode and the two input fields behind it.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Minting,
    Editing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub domain: String,
    pub record: String,
}

#[derive(Debug, Default)]
pub struct EditState {
    mode: EditMode,
    form: FormState,
}

impl EditState {
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn set_domain(&mut self, domain: &str) {
        self.form.domain = domain.to_owned();
    }

    pub fn set_record(&mut self, record: &str) {
        self.form.record = record.to_owned();
    }

    /// Switches to editing `name`; the record field is left for the user.
    pub fn begin(&mut self, name: &str) {
        self.mode = EditMode::Editing;
        self.form.domain = name.to_owned();
    }

    pub fn cancel(&mut self) {
        self.mode = EditMode::Minting;
        self.clear_fields();
    }

    pub fn clear_fields(&mut self) {
        self.form = FormState::default();
    }
}
