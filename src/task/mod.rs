/*!
 * Task Module
 * Task attachment and per-task notification delivery
 */

mod slot;
mod table;

pub use slot::NotificationSlot;
pub use table::{TaskHandle, TaskTable};
