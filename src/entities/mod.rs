//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod event;
pub mod expense;
pub mod holiday;
pub mod installment;
pub mod system_setting;
pub mod user_profile;

// Re-export specific types to avoid conflicts
pub use event::{Column as EventColumn, Entity as Event, Model as EventModel};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use holiday::{Column as HolidayColumn, Entity as Holiday, Model as HolidayModel};
pub use installment::{
    Column as InstallmentColumn, Entity as Installment, Model as InstallmentModel,
};
pub use system_setting::{
    Column as SystemSettingColumn, Entity as SystemSetting, Model as SystemSettingModel,
};
pub use user_profile::{
    Column as UserProfileColumn, Entity as UserProfile, Model as UserProfileModel,
};
