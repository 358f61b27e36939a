// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod decode;
mod listen;
mod run;
mod send;

pub use decode::DecodeCmd;
pub use listen::ListenCmd;
pub use run::RunCmd;
pub use send::SendCmd;
