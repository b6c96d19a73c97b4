pub(crate) fn default_as_true() -> bool { true }
