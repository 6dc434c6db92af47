//! Cross-module integration flows

mod build_verify;
