use std::collections::HashMap;

use glam::Vec3;

// Narrow view of an object-instance container, addressed by name.
pub trait NamedInstanceStore {
    // Adds an instance at the origin. False if the name is taken.
    fn insert_instance(&mut self, name: &str) -> bool;
    fn delete_instance(&mut self, name: &str) -> bool;
    fn translate_instance_to(&mut self, name: &str, position: Vec3) -> bool;
    fn rotate_instance_yaw_to(&mut self, name: &str, yaw: f32) -> bool;
    fn instance_count(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub name: String,
    pub position: Vec3,
    pub yaw: f32,
}

// Arena of instances with a name -> slot index. Freed slots are reused.
#[derive(Debug, Clone, Default)]
pub struct InstancePool {
    slots: Vec<Option<Instance>>,
    free: Vec<usize>,
    by_name: HashMap<String, usize>,
}

impl InstancePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.by_name
            .get(name)
            .and_then(|&slot| self.slots[slot].as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    // Live instances in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.slots.iter().flatten()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.by_name.clear();
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Instance> {
        let slot = *self.by_name.get(name)?;
        self.slots[slot].as_mut()
    }
}

impl NamedInstanceStore for InstancePool {
    fn insert_instance(&mut self, name: &str) -> bool {
        if self.by_name.contains_key(name) {
            return false;
        }
        let instance = Instance {
            name: name.to_owned(),
            position: Vec3::ZERO,
            yaw: 0.0,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(instance);
                slot
            }
            None => {
                self.slots.push(Some(instance));
                self.slots.len() - 1
            }
        };
        self.by_name.insert(name.to_owned(), slot);
        true
    }

    fn delete_instance(&mut self, name: &str) -> bool {
        match self.by_name.remove(name) {
            Some(slot) => {
                self.slots[slot] = None;
                self.free.push(slot);
                true
            }
            None => false,
        }
    }

    fn translate_instance_to(&mut self, name: &str, position: Vec3) -> bool {
        match self.get_mut(name) {
            Some(instance) => {
                instance.position = position;
                true
            }
            None => false,
        }
    }

    fn rotate_instance_yaw_to(&mut self, name: &str, yaw: f32) -> bool {
        match self.get_mut(name) {
            Some(instance) => {
                instance.yaw = yaw;
                true
            }
            None => false,
        }
    }

    fn instance_count(&self) -> usize {
        self.by_name.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut pool = InstancePool::new();
        assert!(pool.insert_instance("a"));
        assert!(!pool.insert_instance("a"));
        assert_eq!(pool.instance_count(), 1);
    }

    #[test]
    fn delete_frees_the_slot_for_reuse() {
        let mut pool = InstancePool::new();
        pool.insert_instance("a");
        pool.insert_instance("b");
        assert!(pool.delete_instance("a"));
        assert!(!pool.delete_instance("a"));
        pool.insert_instance("c");
        assert_eq!(pool.slots.len(), 2);
        assert_eq!(pool.instance_count(), 2);
        assert!(pool.get("a").is_none());
        assert_eq!(pool.get("c").map(|i| i.name.as_str()), Some("c"));
    }

    #[test]
    fn transforms_apply_to_named_instance() {
        let mut pool = InstancePool::new();
        pool.insert_instance("tree");
        assert!(pool.translate_instance_to("tree", Vec3::new(1.0, 2.0, 3.0)));
        assert!(pool.rotate_instance_yaw_to("tree", 1.5));
        assert!(!pool.translate_instance_to("rock", Vec3::ONE));
        let tree = pool.get("tree").unwrap();
        assert_eq!(tree.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(tree.yaw, 1.5);
    }

    #[test]
    fn iter_skips_freed_slots() {
        let mut pool = InstancePool::new();
        for name in ["a", "b", "c"] {
            pool.insert_instance(name);
        }
        pool.delete_instance("b");
        let names: Vec<&str> = pool.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
