//! A max-heap over keys `0..n` with floating point values, used to order variables by activity.
//! Keys can be temporarily removed and later restored while keeping their value, which lets the
//! decision heuristic drop assigned variables and re-insert them on backjump.
use std::ops::AddAssign;
use std::ops::DivAssign;

use super::KeyedVec;
use super::StorageKey;
use crate::sat_assert_moderate;

#[derive(Debug)]
pub struct KeyValueHeap<Key: StorageKey, Value> {
    /// The values, laid out as a binary heap in the range `0..end_position`.
    values: Vec<Value>,
    /// `map_key_to_position[k]` is the position of the value of `k` in `values`.
    map_key_to_position: KeyedVec<Key, usize>,
    /// `map_position_to_key[p]` is the key whose value is stored at position `p`.
    map_position_to_key: Vec<Key>,
    /// Positions at or beyond this index hold removed keys.
    end_position: usize,
}

impl<Key: StorageKey, Value> Default for KeyValueHeap<Key, Value> {
    fn default() -> Self {
        Self {
            values: Vec::default(),
            map_key_to_position: KeyedVec::default(),
            map_position_to_key: Vec::default(),
            end_position: 0,
        }
    }
}

impl<Key, Value> KeyValueHeap<Key, Value>
where
    Key: StorageKey + Copy,
    Value: AddAssign<Value> + DivAssign<Value> + PartialOrd + Default + Copy,
{
    /// Grow the heap until `key` is a valid key; new keys are present and have `default_value`.
    pub fn accommodate(&mut self, key: Key, default_value: Value) {
        while key.index() >= self.len() {
            self.grow(Key::create_from_index(self.len()), default_value);
        }
    }

    /// Return the present key with the largest value, without removing it.
    pub fn peek_max(&self) -> Option<(Key, Value)> {
        if self.is_empty() {
            None
        } else {
            let key = self.map_position_to_key[0];
            Some((key, self.values[0]))
        }
    }

    pub fn get_value(&self, key: Key) -> Value {
        self.values[self.map_key_to_position[key]]
    }

    /// Remove the present key with the largest value from the heap and return it.
    pub fn pop_max(&mut self) -> Option<Key> {
        if self.is_empty() {
            return None;
        }

        let best_key = self.map_position_to_key[0];
        self.delete_key(best_key);
        Some(best_key)
    }

    /// Add `increment` to the value of `key`, which does not need to be present.
    pub fn increment(&mut self, key: Key, increment: Value) {
        let position = self.map_key_to_position[key];
        self.values[position] += increment;

        if self.is_key_present(key) {
            self.sift_up(position);
        }
    }

    /// Put a removed key back into the heap with the value it had when it was removed.
    pub fn restore_key(&mut self, key: Key) {
        if !self.is_key_present(key) {
            let position = self.map_key_to_position[key];
            self.swap_positions(position, self.end_position);
            self.end_position += 1;
            self.sift_up(self.end_position - 1);
        }
    }

    /// Temporarily remove `key` from the heap; its value is kept and is still affected by
    /// [`KeyValueHeap::divide_values`].
    pub fn delete_key(&mut self, key: Key) {
        if self.is_key_present(key) {
            let position = self.map_key_to_position[key];
            self.swap_positions(position, self.end_position - 1);
            self.end_position -= 1;
            if position < self.end_position {
                self.sift_down(position);
            }
        }
    }

    /// The number of keys, including removed ones.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key is currently present.
    pub fn is_empty(&self) -> bool {
        self.end_position == 0
    }

    pub fn is_key_present(&self, key: Key) -> bool {
        self.map_key_to_position[key] < self.end_position
    }

    /// Divide the value of every key, present or not, by `divisor`.
    pub fn divide_values(&mut self, divisor: Value) {
        for value in self.values.iter_mut() {
            *value /= divisor;
        }
    }

    fn grow(&mut self, key: Key, value: Value) {
        let last_index = self.values.len();
        self.values.push(value);
        let _ = self.map_key_to_position.push(last_index);
        self.map_position_to_key.push(key);

        self.swap_positions(self.end_position, last_index);
        self.end_position += 1;
        self.sift_up(self.end_position - 1);
    }

    fn swap_positions(&mut self, a: usize, b: usize) {
        let key_a = self.map_position_to_key[a];
        let key_b = self.map_position_to_key[b];

        self.values.swap(a, b);
        self.map_position_to_key.swap(a, b);
        self.map_key_to_position.swap(key_a.index(), key_b.index());

        sat_assert_moderate!(
            self.map_key_to_position[key_a] == b && self.map_key_to_position[key_b] == a
        );
    }

    fn sift_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if self.values[parent] >= self.values[position] {
                break;
            }

            self.swap_positions(parent, position);
            position = parent;
        }
    }

    fn sift_down(&mut self, mut position: usize) {
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            if left >= self.end_position {
                break;
            }

            let largest_child = if right < self.end_position && self.values[right] > self.values[left]
            {
                right
            } else {
                left
            };

            if self.values[position] >= self.values[largest_child] {
                break;
            }

            self.swap_positions(position, largest_child);
            position = largest_child;
        }
    }
}
