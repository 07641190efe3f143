use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

pub(crate) const READ_SPINNER_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] {msg} {pos} reads ({per_sec})";
pub(crate) const FILE_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar}] {pos}/{len} {msg}";

pub(crate) struct ProgressBarBuilder {
    style_template: &'static str,
    message: String,
    length: Option<u64>,
    enable_tick: bool,
    hidden: bool,
}

impl ProgressBarBuilder {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            style_template: "{spinner:.green} {msg}",
            message: message.into(),
            length: None,
            enable_tick: false,
            hidden: false,
        }
    }

    pub(crate) fn with_template(mut self, template: &'static str) -> Self {
        self.style_template = template;
        self
    }

    /// Turns the spinner into a bar of known length.
    pub(crate) fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub(crate) fn with_tick(mut self) -> Self {
        self.enable_tick = true;
        self
    }

    pub(crate) fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub(crate) fn build(self) -> Result<ProgressBar> {
        let pb = match self.length {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::new_spinner(),
        };

        if self.hidden {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        pb.set_style(ProgressStyle::default_spinner().template(self.style_template)?);
        pb.set_message(self.message);

        if self.enable_tick {
            pb.enable_steady_tick(Duration::from_millis(200));
        }

        Ok(pb)
    }
}
