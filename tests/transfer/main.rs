//! Integration tests for Layer 2: Transfer
//!
//! Tests for occurrence trees, decomposition into transfer objects, and the
//! pointers range encoding.

mod occurrences;
