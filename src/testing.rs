//! Fluent assertions and fixture helpers for rendering tests.

use std::fmt::{Debug, Display};

use proc_macro2::TokenStream;

use crate::config::RenderConfig;
use crate::docs::{DocStore, NoDocs};
use crate::model::Grammar;
use crate::{render, Format};

/// Wraps a `Result` so tests can state their expectation in one call.
pub struct TestResult<T, E> {
    inner: Result<T, E>,
}

impl<T: Debug, E: Display> TestResult<T, E> {
    pub fn new(result: Result<T, E>) -> Self {
        Self { inner: result }
    }

    /// Asserts success and returns the value.
    pub fn assert_success(self) -> T {
        match self.inner {
            Ok(val) => val,
            Err(e) => {
                panic!(
                    "\nTEST FAILED (Expected Success, but got Error):\nMessage: {}\n",
                    e
                );
            }
        }
    }

    /// Asserts failure and returns the error.
    pub fn assert_failure(self) -> E {
        match self.inner {
            Ok(val) => {
                panic!(
                    "\nTEST FAILED (Expected Failure, but got Success):\nValue: {:?}\n",
                    val
                );
            }
            Err(e) => e,
        }
    }

    /// Asserts failure with a message containing `expected_msg_part`.
    pub fn assert_failure_contains(self, expected_msg_part: &str) {
        let err = self.assert_failure();
        let actual_msg = err.to_string();
        if !actual_msg.contains(expected_msg_part) {
            panic!(
                "\nTEST FAILED (Error Message Mismatch):\nExpected part: {:?}\nActual msg:    {:?}\n",
                expected_msg_part, actual_msg
            );
        }
    }
}

pub trait Testable<T, E> {
    fn test(self) -> TestResult<T, E>;
}

impl<T: Debug, E: Display> Testable<T, E> for Result<T, E> {
    fn test(self) -> TestResult<T, E> {
        TestResult::new(self)
    }
}

/// Builds a grammar from notation sources, panicking on invalid input.
pub fn grammar(parser: &str, lexer: &str) -> Grammar {
    crate::parse_grammar(parser, lexer).test().assert_success()
}

/// Like [`grammar`], for `quote!` fixtures. Rules get token-stream lines and
/// no source text, so sections never apply.
pub fn grammar_from_tokens(parser: TokenStream, lexer: TokenStream) -> Grammar {
    grammar_render_model::parse_grammar_tokens(parser, lexer)
        .test()
        .assert_success()
}

pub fn render_text(grammar: &Grammar, config: &RenderConfig) -> String {
    render(grammar, Format::Text, config, &NoDocs)
        .test()
        .assert_success()
}

pub fn render_xml(grammar: &Grammar, config: &RenderConfig, docs: &dyn DocStore) -> String {
    render(grammar, Format::Xml, config, docs)
        .test()
        .assert_success()
}

/// Asserts that `needles` occur in `haystack` in the given order.
pub fn assert_in_order(haystack: &str, needles: &[&str]) {
    let mut rest = haystack;
    for needle in needles {
        match rest.find(needle) {
            Some(pos) => rest = &rest[pos + needle.len()..],
            None => panic!(
                "\nTEST FAILED (Missing or out of order):\nExpected: {:?}\nIn:\n{}\n",
                needle, haystack
            ),
        }
    }
}
