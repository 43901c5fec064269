//! Disposal lifecycle scenarios
