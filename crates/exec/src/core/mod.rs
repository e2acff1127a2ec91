pub(crate) mod classify;
pub(crate) mod coverage;
pub(crate) mod execute;
pub(crate) mod replace;
