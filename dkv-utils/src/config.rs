// Copyright 2019-2021 Parity Technologies (UK) Ltd.
// This file is part of dkv.

// dkv is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// dkv is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with dkv.  If not, see <http://www.gnu.org/licenses/>.

//! Config validation plumbing shared by every config section.

use crate::error::{Error, Result};

/// Implemented by every section of the top-level YAML config: each section knows how to check
/// its own required fields and leaves composition to the caller.
pub trait Validate {
	fn validate(&self) -> Result<()>;
}

/// Runs a list of validators in order, short-circuiting (and naming the failing section) on the
/// first error.
pub fn validate_all(sections: &[(&str, &dyn Fn() -> Result<()>)]) -> Result<()> {
	for (name, validate) in sections {
		validate().map_err(|err| Error::Config(format!("{name}: {err}")))?;
	}
	Ok(())
}
