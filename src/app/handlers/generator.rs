// SPDX-License-Identifier: GPL-3.0-only

//! Generator input handler

use crate::app::state::{AppState, Effects};
use crate::qr::generate;

impl AppState {
    pub(crate) fn handle_input_changed(&mut self, text: String) -> Effects {
        self.generator.preview = generate(&text);
        self.generator.text = text;
        Vec::new()
    }
}
