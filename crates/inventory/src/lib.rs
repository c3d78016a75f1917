//! Stock locations: the inventory sites a supplier ships from.

pub mod location;

pub use location::{
    CreateStockLocation, LocationActivationChanged, SetLocationActive, StockLocation,
    StockLocationCommand, StockLocationCreated, StockLocationEvent,
};
