// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod coordinator;
pub mod gateway;
pub mod ids;
pub mod model;
pub mod normalize;
pub mod state;
pub mod view_model;

pub use coordinator::*;
pub use gateway::*;
pub use ids::*;
pub use model::*;
pub use normalize::*;
pub use state::*;
pub use view_model::*;
