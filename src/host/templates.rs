//! Template rendering behind a shared handle.

use std::sync::{Arc, Mutex};

use minijinja::Environment;
use serde_json::{Map, Value};

use crate::error::TemplateError;

/// A shared minijinja environment. Clones render from the same template set.
#[derive(Clone)]
pub struct Templates {
    env: Arc<Mutex<Environment<'static>>>,
}

impl Templates {
    pub fn new() -> Self {
        Self {
            env: Arc::new(Mutex::new(Environment::new())),
        }
    }

    /// Add (or replace) a template under `name`.
    pub fn add(&self, name: &str, source: &str) -> Result<(), TemplateError> {
        let mut env = self.env.lock().expect("template lock poisoned");
        env.add_template_owned(name.to_owned(), source.to_owned())?;
        Ok(())
    }

    /// Render `name` with a JSON object context.
    pub fn render(&self, name: &str, context: &Map<String, Value>) -> Result<String, TemplateError> {
        let env = self.env.lock().expect("template lock poisoned");
        let template = env
            .get_template(name)
            .map_err(|_| TemplateError::UnknownTemplate(name.to_owned()))?;
        Ok(template.render(context)?)
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}
