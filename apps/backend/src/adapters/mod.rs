//! SeaORM adapters. Free functions over any `ConnectionTrait`, returning `DbErr`.

pub mod events_sea;
pub mod tickets_sea;
pub mod users_sea;
