//! Test module for yam-core
//!
//! Cross-module scenarios:
//! - Registry refresh loop and change publication
//! - Filter pipeline through the core facade, including supersession
//! - Shortcut binding, persistence and launch resolution
//! - Config hot reload and app overrides
//! - Property checks for matching and change detection

mod shortcut_tests;
