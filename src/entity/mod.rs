pub mod audit_logs;
pub mod cart_item_extras;
pub mod cart_items;
pub mod cash_movements;
pub mod cash_registers;
pub mod categories;
pub mod comanda_item_extras;
pub mod comanda_items;
pub mod comandas;
pub mod coupons;
pub mod dining_tables;
pub mod extras;
pub mod loyalty_accounts;
pub mod loyalty_transactions;
pub mod order_item_extras;
pub mod order_items;
pub mod order_notes;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod status_history;
pub mod store_settings;
pub mod users;
pub mod wishlists;

pub use audit_logs::Entity as AuditLogs;
pub use cart_item_extras::Entity as CartItemExtras;
pub use cart_items::Entity as CartItems;
pub use cash_movements::Entity as CashMovements;
pub use cash_registers::Entity as CashRegisters;
pub use categories::Entity as Categories;
pub use comanda_item_extras::Entity as ComandaItemExtras;
pub use comanda_items::Entity as ComandaItems;
pub use comandas::Entity as Comandas;
pub use coupons::Entity as Coupons;
pub use dining_tables::Entity as DiningTables;
pub use extras::Entity as Extras;
pub use loyalty_accounts::Entity as LoyaltyAccounts;
pub use loyalty_transactions::Entity as LoyaltyTransactions;
pub use order_item_extras::Entity as OrderItemExtras;
pub use order_items::Entity as OrderItems;
pub use order_notes::Entity as OrderNotes;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use status_history::Entity as StatusHistory;
pub use store_settings::Entity as StoreSettings;
pub use users::Entity as Users;
pub use wishlists::Entity as Wishlists;
