pub mod dispute_usecase;
pub mod locks;
pub mod notification_usecase;
pub mod offer_usecase;
pub mod reputation_usecase;
pub mod trade_room_usecase;
pub mod trade_usecase;

// Re-export public API
pub use dispute_usecase::DisputeDesk;
pub use notification_usecase::NotificationDispatcher;
pub use offer_usecase::OfferCatalog;
pub use reputation_usecase::ReputationUpdater;
pub use trade_room_usecase::TradeRooms;
pub use trade_usecase::TradeLifecycle;
