// -
// Form identity

/// Prefix of generated form ids (`formly_1`, `formly_2`, ...)
pub(crate) const DEFAULT_FORM_ID_PREFIX: &str = "formly";

/// First number handed out by a fresh form id counter
pub(crate) const DEFAULT_FIRST_FORM_ID: u64 = 1;

// -
// Debug labels and error reports

/// Prefix used when labelling wrapped watch functions
pub(crate) const DEFAULT_LABEL_PREFIX: &str = "Formly";

/// Prefix prepended to every user facing error message
pub(crate) const DEFAULT_ERROR_PREFIX: &str = "Formly Error";

// -
// Change detection

/// Root identifier every model path expression starts with
pub(crate) const MODEL_ROOT: &str = "model";

/// Dirty passes a digest may run before it gives up
pub(crate) const DEFAULT_MAX_DIGEST_ITERATIONS: usize = 10;

/// Form element name accepted by the attribute boundary
pub(crate) const DEFAULT_FORM_NAME: &str = "form";
