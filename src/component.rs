//! Type-erased renderable elements.
//!
//! A [`Component`] describes one kind of renderable unit: how to build its visual
//! content, how to apply itself into that content, and how to compare against a
//! next value of the same kind. [`AnyComponent`] erases the concrete kind so that
//! heterogeneous elements can live side by side in a [`Section`](crate::Section).
use crate::errors::ReconcilerError;
use crate::types::{ReuseKey, Size};
use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

pub trait Component: 'static {
    /// Visual content produced by this kind of element.
    type Content: 'static;

    /// Builds a fresh content instance. Called once per visual instance.
    fn render_content(&self) -> Self::Content;

    /// Applies this element's data into existing content.
    fn render(&self, content: &mut Self::Content);

    /// Content equality used by diffing. Must be reflexive and must return `false`
    /// whenever re-rendering `next` would look different.
    fn is_content_equal(&self, next: &Self) -> bool;

    /// Last-chance veto evaluated against already rendered content.
    fn should_render(&self, _next: &Self, _content: &Self::Content) -> bool {
        true
    }

    /// Preferred size inside the given bounds, `None` to let the container decide.
    fn reference_size(&self, _bounds: Size) -> Option<Size> {
        None
    }

    fn content_will_display(&self, _content: &mut Self::Content) {}

    fn content_did_end_display(&self, _content: &mut Self::Content) {}

    fn reuse_key(&self) -> ReuseKey {
        ReuseKey::of::<Self>()
    }
}

/// Object-safe view over any `Component`.
trait ErasedComponent {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
    fn content_type_name(&self) -> &'static str;
    fn reuse_key(&self) -> ReuseKey;
    fn render_content(&self) -> Box<dyn Any>;
    fn render(&self, content: &mut dyn Any) -> bool;
    fn is_content_equal(&self, other: &dyn ErasedComponent) -> bool;
    fn should_render(&self, next: &dyn ErasedComponent, content: &dyn Any) -> bool;
    fn will_display(&self, content: &mut dyn Any);
    fn did_end_display(&self, content: &mut dyn Any);
    fn reference_size(&self, bounds: Size) -> Option<Size>;
}

impl<C: Component> ErasedComponent for C {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn content_type_name(&self) -> &'static str {
        std::any::type_name::<C::Content>()
    }

    fn reuse_key(&self) -> ReuseKey {
        Component::reuse_key(self)
    }

    fn render_content(&self) -> Box<dyn Any> {
        Box::new(Component::render_content(self))
    }

    fn render(&self, content: &mut dyn Any) -> bool {
        match content.downcast_mut::<C::Content>() {
            Some(content) => {
                Component::render(self, content);
                true
            }
            None => false,
        }
    }

    fn is_content_equal(&self, other: &dyn ErasedComponent) -> bool {
        // Different kinds under one identity always count as changed.
        other
            .as_any()
            .downcast_ref::<C>()
            .is_some_and(|other| Component::is_content_equal(self, other))
    }

    fn should_render(&self, next: &dyn ErasedComponent, content: &dyn Any) -> bool {
        match (next.as_any().downcast_ref::<C>(), content.downcast_ref::<C::Content>()) {
            (Some(next), Some(content)) => Component::should_render(self, next, content),
            _ => true,
        }
    }

    fn will_display(&self, content: &mut dyn Any) {
        if let Some(content) = content.downcast_mut::<C::Content>() {
            self.content_will_display(content);
        }
    }

    fn did_end_display(&self, content: &mut dyn Any) {
        if let Some(content) = content.downcast_mut::<C::Content>() {
            self.content_did_end_display(content);
        }
    }

    fn reference_size(&self, bounds: Size) -> Option<Size> {
        Component::reference_size(self, bounds)
    }
}

/// Cheaply clonable, type-erased element.
#[derive(Clone)]
pub struct AnyComponent(Rc<dyn ErasedComponent>);

impl AnyComponent {
    pub fn new<C: Component>(component: C) -> Self {
        AnyComponent(Rc::new(component))
    }

    /// Kind of the wrapped element.
    pub fn kind(&self) -> TypeId {
        self.0.as_any().type_id()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub fn reuse_key(&self) -> ReuseKey {
        self.0.reuse_key()
    }

    pub fn downcast_ref<C: Component>(&self) -> Option<&C> {
        self.0.as_any().downcast_ref::<C>()
    }

    pub fn is<C: Component>(&self) -> bool {
        self.kind() == TypeId::of::<C>()
    }

    pub fn render_content(&self) -> Box<dyn Any> {
        self.0.render_content()
    }

    /// Applies this element into `content`. Content built by a different kind is
    /// rejected with [`ReconcilerError::ContentMismatch`].
    pub fn render(&self, content: &mut dyn Any) -> Result<(), ReconcilerError> {
        if self.0.render(content) {
            Ok(())
        } else {
            Err(ReconcilerError::ContentMismatch {
                component: self.type_name(),
                content: self.0.content_type_name(),
            })
        }
    }

    pub fn is_content_equal(&self, other: &AnyComponent) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.is_content_equal(other.0.as_ref())
    }

    /// Asks the element that produced `content` whether `next` should be applied.
    pub fn should_render(&self, next: &AnyComponent, content: &dyn Any) -> bool {
        self.0.should_render(next.0.as_ref(), content)
    }

    pub fn will_display(&self, content: &mut dyn Any) {
        self.0.will_display(content)
    }

    pub fn did_end_display(&self, content: &mut dyn Any) {
        self.0.did_end_display(content)
    }

    pub fn reference_size(&self, bounds: Size) -> Option<Size> {
        self.0.reference_size(bounds)
    }
}

impl fmt::Debug for AnyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyComponent({})", self.type_name())
    }
}

impl<C: Component> From<C> for AnyComponent {
    fn from(component: C) -> Self {
        AnyComponent::new(component)
    }
}
