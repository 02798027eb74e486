use std::cell::RefCell;
use std::rc::Rc;

use voxaccess::{Config, ServiceClient, Workflow, WorkflowEvent};

use crate::ui::window::MainWindow;

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub config: Config,
    pub tokio_rt: tokio::runtime::Runtime,
    pub workflow: Workflow,
    pub window: Option<MainWindow>,
}

pub type SharedState = Rc<RefCell<AppState>>;

impl AppState {
    pub fn new(sender: async_channel::Sender<WorkflowEvent>) -> Self {
        let mut config = Config::load();
        let client = match ServiceClient::from_config(&config) {
            Ok(client) => client,
            Err(e) => {
                log::warn!("Invalid backend '{}': {e}, using default", config.backend_url);
                config.backend_url = voxaccess::config::DEFAULT_BACKEND_URL.into();
                ServiceClient::from_config(&config).expect("Default backend URL is valid")
            }
        };
        let tokio_rt = tokio::runtime::Runtime::new()
            .expect("Failed to create tokio runtime");
        let workflow = Workflow::new(
            client,
            config.resolved_export_dir(),
            tokio_rt.handle().clone(),
            sender,
        );

        Self {
            config,
            tokio_rt,
            workflow,
            window: None,
        }
    }
}
