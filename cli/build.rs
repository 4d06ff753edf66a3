// Copyright (C) 2024 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;

use grev::git_revision_auto;


fn main() -> Result<()> {
  let dir = env!("CARGO_MANIFEST_DIR");
  // Not every build happens from within a git checkout, so a missing
  // revision is no reason to fail.
  if let Some(git_rev) = git_revision_auto(dir).ok().flatten() {
    println!(
      "cargo:rustc-env=VERSION={} ({})",
      env!("CARGO_PKG_VERSION"),
      git_rev
    );
  } else {
    println!("cargo:rustc-env=VERSION={}", env!("CARGO_PKG_VERSION"));
  }
  Ok(())
}
