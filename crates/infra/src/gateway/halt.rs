use costs_core::Route;

/// Session flash key used for status messages.
pub const STATUS_FLASH_KEY: &str = "status";

/// Flash status set when a POST fails at the transport level.
pub const API_ERROR_STATUS: &str = "api-error";

/// One-shot session value to be set alongside a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub key: &'static str,
    pub value: String,
}

impl FlashMessage {
    pub fn status(value: impl Into<String>) -> Self {
        Self {
            key: STATUS_FLASH_KEY,
            value: value.into(),
        }
    }
}

/// Where a halted request goes and what it leaves in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTo {
    pub target: Route,
    pub flash: Vec<FlashMessage>,
    /// The upstream rejected the bearer token; the session is no longer usable.
    pub clear_session: bool,
}

impl RedirectTo {
    pub fn new(target: Route) -> Self {
        Self {
            target,
            flash: Vec::new(),
            clear_session: false,
        }
    }

    pub fn with_flash(mut self, flash: FlashMessage) -> Self {
        self.flash.push(flash);
        self
    }

    pub fn clearing_session(mut self, clear: bool) -> Self {
        self.clear_session = clear;
        self
    }
}

/// Terminal outcome of a gateway call that did not get its expected status.
///
/// Controllers propagate this with `?`; nothing after the failing call runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// Expected, well-formed failure (e.g. validation error): redirect to the
    /// failure target.
    Failure(RedirectTo),
    /// Transport error, unhandled status or a failed error report: redirect to
    /// the exception target.
    Exception(RedirectTo),
    /// Neither target was configured. Rendered as a bare 502.
    Unhandled { reason: String },
}

impl Halt {
    pub fn redirect(&self) -> Option<&RedirectTo> {
        match self {
            Halt::Failure(r) | Halt::Exception(r) => Some(r),
            Halt::Unhandled { .. } => None,
        }
    }

    pub fn target(&self) -> Option<&Route> {
        self.redirect().map(|r| &r.target)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Halt::Failure(_))
    }

    pub fn is_exception(&self) -> bool {
        matches!(self, Halt::Exception(_))
    }
}
