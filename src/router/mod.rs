mod table;

pub use table::{RouteAction, RouteEntry, RouteTable, RoutedMessage};
