// Pattern extraction over the module syntax tree
//
// Each recognizer is total over its node and returns an optional fragment of
// the deployment intent. The extractor walks module members in declaration
// order and folds the fragments together, so name references only resolve
// against declarations seen earlier in the module.

pub mod intent;
pub mod listener;
pub mod schedule;
pub mod service;
pub mod tls;

pub use intent::{
    DeploymentIntent, ListenerInfo, MutualSslConfig, ResourceInfo, SecureSocketConfig,
    ServiceInfo, Task, TlsConfig,
};

use crate::syntax::{ModuleMember, ModulePart};
use listener::ModuleBinding;
use tracing::{debug, info};

/// Builds a [`DeploymentIntent`] from a parsed module
#[derive(Debug, Default)]
pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, module: &ModulePart) -> DeploymentIntent {
        let mut intent = DeploymentIntent::default();

        for member in &module.members {
            match member {
                ModuleMember::ModuleVariableDeclaration(decl) => {
                    match listener::recognize_module_variable(decl, &intent.named_configs) {
                        Some(ModuleBinding::Listener(listener)) => {
                            debug!(listener = %listener.name, port = listener.port, "Found listener variable");
                            intent.listeners.push(listener);
                        }
                        Some(ModuleBinding::ListenerConfig { name, config }) => {
                            debug!(config = %name, "Found listener configuration");
                            intent.named_configs.insert(name, config);
                        }
                        Some(ModuleBinding::IntVariable { name, value }) => {
                            intent.int_variables.insert(name, value);
                        }
                        None => {}
                    }
                }
                ModuleMember::ListenerDeclaration(decl) => {
                    if let Some(listener) =
                        listener::recognize_listener_declaration(decl, &intent.named_configs)
                    {
                        debug!(listener = %listener.name, port = listener.port, "Found listener declaration");
                        intent.listeners.push(listener);
                    }
                }
                ModuleMember::ServiceDeclaration(decl) => {
                    let fragment = service::recognize_service(decl, &intent);
                    debug!(
                        service = %fragment.service.path,
                        listener = %fragment.service.listener.name,
                        resources = fragment.service.resources.len(),
                        "Found service"
                    );
                    if let Some(inline) = fragment.inline_listener {
                        intent.listeners.push(inline);
                    }
                    intent.services.push(fragment.service);
                }
                ModuleMember::FunctionDefinition(function) => {
                    if let Some(task) = schedule::recognize_task(function) {
                        debug!(schedule = %task.schedule(), "Found scheduled task");
                        intent.task = Some(task);
                    }
                }
                ModuleMember::Other => {}
            }
        }

        info!(
            listeners = intent.listeners.len(),
            services = intent.services.len(),
            task = intent.task.is_some(),
            "Extraction complete"
        );
        intent
    }
}
