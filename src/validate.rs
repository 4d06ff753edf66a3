// Copyright (C) 2024 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use lettre::message::Mailbox;


/// Check whether a file system entry exists at `path`.
///
/// Only a definitive "not found" is treated as absence. Any other
/// error (e.g., lack of permissions) is reported once the file is
/// actually read.
pub fn file_exists(path: &Path) -> bool {
  path.try_exists().unwrap_or(true)
}

/// Check whether `email` is a syntactically valid single mailbox, i.e.,
/// `local@domain` with an optional display name.
///
/// No DNS or other network lookups are performed.
pub fn is_valid_email(email: &str) -> bool {
  email.parse::<Mailbox>().is_ok()
}


#[cfg(test)]
mod tests {
  use super::*;

  use std::fs::write;

  use tempfile::tempdir;


  /// Check that we detect existing and missing files.
  #[test]
  fn file_existence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("attachment.txt");
    assert!(!file_exists(&path));

    let () = write(&path, b"content").unwrap();
    assert!(file_exists(&path));
    // Directories are file system entries as well.
    assert!(file_exists(dir.path()));
  }

  /// Check that we accept well formed email addresses.
  #[test]
  fn valid_emails() {
    assert!(is_valid_email("user@example.com"));
    assert!(is_valid_email("a@b.c"));
    assert!(is_valid_email("first.last+tag@sub.example.org"));
    assert!(is_valid_email("User Name <user@example.com>"));
  }

  /// Check that we reject malformed email addresses.
  #[test]
  fn invalid_emails() {
    assert!(!is_valid_email(""));
    assert!(!is_valid_email("not-an-email"));
    assert!(!is_valid_email("a@"));
    assert!(!is_valid_email("@example.com"));
    assert!(!is_valid_email("a.b.c"));
  }
}
