// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod filter_input;
pub mod keys;
pub mod line;
pub mod msg;
pub mod state;
pub mod table;
pub mod view;

pub use filter_input::*;
pub use keys::*;
pub use line::*;
pub use msg::*;
pub use state::*;
pub use table::*;
pub use view::*;
