pub mod controller;
pub mod session;
pub mod traits;

pub use controller::{GENERIC_ERROR_MESSAGE, WorkflowController, WorkflowError};
pub use session::{WorkflowStatus, WorkflowStep};
pub use traits::{DashboardApi, PdfApi, WorkflowObserver};
