//! The engine façade: register templates, then expand and render trees.
//!
//! ```
//! use bemforge::{Bh, Node};
//! use serde_json::json;
//!
//! let mut bh = Bh::new();
//! bh.register("button", |ctx| {
//!     ctx.set_tag("button", false).set_attr("type", "button", false);
//!     Ok(None)
//! });
//! let html = bh.apply(Node::from(json!({"block": "button", "content": "OK"}))).unwrap();
//! assert_eq!(html, r#"<button class="button" type="button">OK</button>"#);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::engine::{Context, Expander, IdGenerator};
use crate::error::Result;
use crate::literal;
use crate::matcher::{Dispatcher, Registry, Selectors, Template};
use crate::options::Options;
use crate::render::HtmlRenderer;
use crate::selector::{AFTER, BEFORE};
use crate::tree::{Node, Scalar};

/// Template registry plus options; entry point for every run.
pub struct Bh {
    registry: Registry,
    options: Options,
    /// Compiled from `registry`; dropped on every registration.
    dispatcher: RefCell<Option<Rc<Dispatcher>>>,
    ids: IdGenerator,
}

impl Default for Bh {
    fn default() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        Self {
            registry: Registry::new(),
            options: Options::default(),
            dispatcher: RefCell::new(None),
            ids: IdGenerator::new(seed),
        }
    }
}

impl fmt::Debug for Bh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bh")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Bh {
    /// Create an engine with default options and no templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given options.
    pub fn with_options(options: Options) -> Result<Self> {
        let mut bh = Self::new();
        bh.set_options(options)?;
        Ok(bh)
    }

    /// Replace the options after validating them.
    pub fn set_options(&mut self, options: Options) -> Result<&mut Self> {
        options.validate()?;
        self.options = options;
        self.invalidate();
        Ok(self)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register a template under one or more selectors.
    ///
    /// Templates registered later run first for the same node.
    pub fn register<F>(&mut self, selectors: impl Selectors, template: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> Result<Option<Node>> + 'static,
    {
        self.register_template(selectors, Rc::new(template))
    }

    /// Register a batch of `(selectors, template)` pairs in order.
    pub fn register_map<I, S>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, Template)>,
        S: Selectors,
    {
        for (selectors, template) in pairs {
            self.register_template(selectors, template);
        }
        self
    }

    /// Register a hook that runs on every element before the rules.
    ///
    /// Its return value is ignored.
    pub fn before_each<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> Result<Option<Node>> + 'static,
    {
        self.register(BEFORE, hook)
    }

    /// Register a hook that runs on every element after the rules.
    ///
    /// Its return value is ignored.
    pub fn after_each<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> Result<Option<Node>> + 'static,
    {
        self.register(AFTER, hook)
    }

    fn register_template(&mut self, selectors: impl Selectors, template: Template) -> &mut Self {
        if !self.registry.register(selectors, template).is_empty() {
            self.invalidate();
        }
        self
    }

    fn invalidate(&mut self) {
        self.dispatcher.get_mut().take();
    }

    /// The compiled dispatcher, building it on first use.
    fn dispatcher(&self) -> Rc<Dispatcher> {
        let mut slot = self.dispatcher.borrow_mut();
        match slot.as_ref() {
            Some(dispatcher) => Rc::clone(dispatcher),
            None => {
                let dispatcher = Rc::new(Dispatcher::compile(&self.registry, &self.options));
                *slot = Some(Rc::clone(&dispatcher));
                dispatcher
            }
        }
    }

    // -----------------------------------------------------------------------
    // Runs
    // -----------------------------------------------------------------------

    /// Expand `input` with the registered templates and render it to HTML.
    ///
    /// A text input that looks like a bracketed literal is parsed first.
    pub fn apply(&self, input: impl Into<Node>) -> Result<String> {
        let expanded = self.process(input)?;
        Ok(self.to_html(&expanded))
    }

    /// Expand `input` without rendering.
    pub fn process(&self, input: impl Into<Node>) -> Result<Node> {
        let root = parse_literal_input(input.into())?;
        let dispatcher = self.dispatcher();
        dispatcher.reset_counter();
        tracing::debug!(rules = self.registry.len(), "expanding tree");

        let expander = Expander {
            options: &self.options,
            dispatcher: &dispatcher,
            ids: &self.ids,
        };
        expander.expand(root, None, None)
    }

    /// Render an already expanded tree.
    pub fn to_html(&self, node: &Node) -> String {
        HtmlRenderer::new(&self.options).render(node)
    }
}

fn parse_literal_input(node: Node) -> Result<Node> {
    match node {
        Node::Scalar(Scalar::Text(text)) => match literal::as_literal(&text) {
            Some(source) => Ok(Node::from(literal::parse(source)?)),
            None => Ok(Node::Scalar(Scalar::Text(text))),
        },
        other => Ok(other),
    }
}
