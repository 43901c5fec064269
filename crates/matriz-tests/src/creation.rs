//! Construction and element access
