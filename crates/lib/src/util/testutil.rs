//! Test utilities for forge-lib.
//!
//! In-memory content trees and stub builders with scripted behavior.

use std::sync::Arc;

use crate::builder::{Builder, BuilderDescriptor, BuilderEntry};
use crate::error::{BuildError, CompileError};
use crate::resource::{FileSystem, MemoryFileSystem};
use crate::task::Task;

/// In-memory file system with build dir `build`, seeded with `(path, content)` pairs.
pub fn memory_fs(files: &[(&str, &str)]) -> Arc<dyn FileSystem> {
  let fs = MemoryFileSystem::new("build");
  for (path, content) in files {
    fs.add_file(path, content);
  }
  Arc::new(fs)
}

#[derive(Debug, Clone, Copy)]
enum Behavior {
  /// Copy the primary input into every output.
  Copy,
  /// Report a compile error on line 1.
  Fail,
  Panic,
  /// Succeed without writing anything.
  Forget,
}

/// Builder whose `build` follows a fixed script.
pub struct StubBuilder {
  descriptor: BuilderDescriptor,
  behavior: Behavior,
}

impl StubBuilder {
  fn descriptor(name: &'static str, in_ext: &'static str, out_ext: &'static str) -> BuilderDescriptor {
    let in_exts: &'static [&'static str] = Box::leak(Box::new([in_ext]));
    BuilderDescriptor::new(name, in_exts, out_ext)
  }

  pub fn arc(name: &'static str, in_ext: &'static str, out_ext: &'static str) -> Arc<dyn Builder> {
    Arc::new(StubBuilder {
      descriptor: Self::descriptor(name, in_ext, out_ext),
      behavior: Behavior::Copy,
    })
  }

  pub fn entry(name: &'static str, in_ext: &'static str, out_ext: &'static str) -> BuilderEntry {
    BuilderEntry::new(Self::descriptor(name, in_ext, out_ext), |d| -> Arc<dyn Builder> {
      Arc::new(StubBuilder {
        descriptor: *d,
        behavior: Behavior::Copy,
      })
    })
  }

  pub fn failing_entry(name: &'static str, in_ext: &'static str, out_ext: &'static str) -> BuilderEntry {
    BuilderEntry::new(Self::descriptor(name, in_ext, out_ext), |d| -> Arc<dyn Builder> {
      Arc::new(StubBuilder {
        descriptor: *d,
        behavior: Behavior::Fail,
      })
    })
  }

  pub fn panicking_entry(name: &'static str, in_ext: &'static str, out_ext: &'static str) -> BuilderEntry {
    BuilderEntry::new(Self::descriptor(name, in_ext, out_ext), |d| -> Arc<dyn Builder> {
      Arc::new(StubBuilder {
        descriptor: *d,
        behavior: Behavior::Panic,
      })
    })
  }

  pub fn forgetful_entry(name: &'static str, in_ext: &'static str, out_ext: &'static str) -> BuilderEntry {
    BuilderEntry::new(Self::descriptor(name, in_ext, out_ext), |d| -> Arc<dyn Builder> {
      Arc::new(StubBuilder {
        descriptor: *d,
        behavior: Behavior::Forget,
      })
    })
  }
}

impl Builder for StubBuilder {
  fn descriptor(&self) -> &BuilderDescriptor {
    &self.descriptor
  }

  fn build(&self, task: &Task) -> Result<(), BuildError> {
    let input = task.primary_input();
    match self.behavior {
      Behavior::Copy => {
        let content = input.content()?;
        for output in task.outputs() {
          output.set_content(&content)?;
        }
        Ok(())
      }
      Behavior::Fail => Err(CompileError::new(input, "stub failure").with_line(1).into()),
      Behavior::Panic => panic!("stub panic in {}", input),
      Behavior::Forget => Ok(()),
    }
  }
}
