pub mod export;
pub mod qr;
pub mod roster;
pub mod scanner;
pub mod sweeper;
