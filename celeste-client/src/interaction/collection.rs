use std::sync::{Arc, RwLock};

/// The view-owned item list as seen by a coordinator.
///
/// Coordinators never mutate items in place: they derive a new list from the
/// current one through `update`, which holds the collection for the whole
/// read-modify-write so changes to different items never overwrite each
/// other. `replace` swaps in a whole list (a refetch) and is last-write-wins.
pub trait ItemCollection<T>: Send + Sync {
    fn items(&self) -> Vec<T>;

    fn replace(&self, items: Vec<T>);

    /// Atomically replace the list with `change(current)`. Returning `None`
    /// leaves the list untouched.
    fn update(&self, change: &mut dyn FnMut(&[T]) -> Option<Vec<T>>);
}

type Listener<T> = Box<dyn Fn(&[T]) + Send + Sync>;

/// Stock `ItemCollection`: a shared list with an optional change listener
pub struct SharedItems<T> {
    items: RwLock<Vec<T>>,
    listener: Option<Listener<T>>,
}

impl<T: Clone + Send + Sync> SharedItems<T> {
    pub fn new(items: Vec<T>) -> Arc<Self> {
        Arc::new(Self {
            items: RwLock::new(items),
            listener: None,
        })
    }

    /// Like `new`, calling `listener` with the new list after every replacement
    pub fn with_listener(
        items: Vec<T>,
        listener: impl Fn(&[T]) + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            items: RwLock::new(items),
            listener: Some(Box::new(listener)),
        })
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> ItemCollection<T> for SharedItems<T> {
    fn items(&self) -> Vec<T> {
        self.items.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn replace(&self, items: Vec<T>) {
        {
            let mut guard = self.items.write().unwrap_or_else(|e| e.into_inner());
            *guard = items;
        }
        self.notify();
    }

    fn update(&self, change: &mut dyn FnMut(&[T]) -> Option<Vec<T>>) {
        {
            let mut guard = self.items.write().unwrap_or_else(|e| e.into_inner());
            match change(guard.as_slice()) {
                Some(next) => *guard = next,
                None => return,
            }
        }
        self.notify();
    }
}

impl<T: Clone + Send + Sync> SharedItems<T> {
    fn notify(&self) {
        if let Some(listener) = &self.listener {
            let current = self.items();
            listener(&current);
        }
    }
}
