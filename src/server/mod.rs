//! Persistent lookup server for warm suggestions
//!
//! This module provides a daemon that keeps the word list loaded in memory,
//! so interactive sessions and one-shot queries skip the cold load.
//!
//! Architecture:
//! - daemon: owns a lookup service, listens on a Unix socket, answers the
//!   lookup endpoint
//! - client: connects to the socket, sends raw queries, receives replies
//! - fallback: if the daemon is unavailable, callers build a lookup service
//!   in-process

mod client;
pub mod daemon;
pub mod protocol;

pub use client::{ClientError, ClientResult, LookupClient};
pub use daemon::LookupServer;

use std::path::PathBuf;

/// Get the socket path for the lookup server
/// Uses a per-user runtime directory for security
pub fn get_socket_path() -> PathBuf {
    // Try XDG_RUNTIME_DIR first (most secure, tmpfs-backed)
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join("wordfind.sock");
    }

    // Fall back to user's home directory
    if let Some(home) = dirs::home_dir() {
        return home.join(".local").join("run").join("wordfind.sock");
    }

    // Last resort: /tmp with user ID
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/tmp/wordfind-{}.sock", uid))
}

/// Get the PID file path for the daemon
pub fn get_pid_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join("wordfind.pid");
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".local").join("run").join("wordfind.pid");
    }

    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/tmp/wordfind-{}.pid", uid))
}

/// Check if the daemon is running
pub fn is_daemon_running() -> bool {
    let pid_path = get_pid_path();
    if !pid_path.exists() {
        return false;
    }

    // Read PID and check if process exists
    if let Ok(pid_str) = std::fs::read_to_string(&pid_path)
        && let Ok(pid) = pid_str.trim().parse::<i32>()
    {
        // Check if process exists using kill(pid, 0)
        return unsafe { libc::kill(pid, 0) == 0 };
    }

    false
}
