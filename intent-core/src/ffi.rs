//! FFI layer for host applications
//!
//! Provides C-compatible functions that return classification results as JSON strings.
//! Strings returned from this module must be released with `intent_free_string`.

// FFI functions necessarily work with raw pointers - this is expected behavior
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use tracing::{debug, error};

use crate::classifier::{self, IntentClassifier};
use crate::lexicon::Lexicon;
use crate::types::ClassificationResult;

/// Opaque handle to a classifier compiled from a custom lexicon
pub struct IntentHandle {
    classifier: IntentClassifier,
}

fn read_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

fn into_c_json(result: &ClassificationResult) -> *mut c_char {
    match CString::new(result.to_json()) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Classify text with the built-in lexicon
/// Returns JSON like `{"intent":"SET_TIMER","parameter":5}`, or null for null/invalid UTF-8 input
#[unsafe(no_mangle)]
pub extern "C" fn intent_classify(text: *const c_char) -> *mut c_char {
    let Some(text) = read_str(text) else {
        return ptr::null_mut();
    };
    into_c_json(&classifier::classify(text))
}

/// Create a classifier from a lexicon JSON document (null for the built-in lexicon)
/// Returns null if the lexicon is malformed or invalid
#[unsafe(no_mangle)]
pub extern "C" fn intent_classifier_new(lexicon_json: *const c_char) -> *mut IntentHandle {
    let lexicon = if lexicon_json.is_null() {
        Lexicon::default()
    } else {
        let Some(json) = read_str(lexicon_json) else {
            error!("Lexicon JSON is not valid UTF-8");
            return ptr::null_mut();
        };
        match Lexicon::from_json(json) {
            Ok(lexicon) => lexicon,
            Err(e) => {
                error!("Invalid lexicon: {}", e);
                return ptr::null_mut();
            }
        }
    };

    match IntentClassifier::from_lexicon(&lexicon) {
        Ok(classifier) => Box::into_raw(Box::new(IntentHandle { classifier })),
        Err(e) => {
            error!("Failed to compile lexicon: {}", e);
            ptr::null_mut()
        }
    }
}

/// Classify text with a handle from `intent_classifier_new`
#[unsafe(no_mangle)]
pub extern "C" fn intent_classifier_classify(
    handle: *const IntentHandle,
    text: *const c_char,
) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }
    let handle = unsafe { &*handle };
    let Some(text) = read_str(text) else {
        return ptr::null_mut();
    };
    into_c_json(&handle.classifier.classify(text))
}

/// Destroy a handle from `intent_classifier_new`
#[unsafe(no_mangle)]
pub extern "C" fn intent_classifier_destroy(handle: *mut IntentHandle) {
    if !handle.is_null() {
        unsafe {
            drop(Box::from_raw(handle));
        }
        debug!("Intent classifier destroyed");
    }
}

/// Free a string returned by this module
#[unsafe(no_mangle)]
pub extern "C" fn intent_free_string(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            drop(CString::from_raw(s));
        }
    }
}
