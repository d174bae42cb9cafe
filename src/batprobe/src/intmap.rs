/*****************************************************************************************[intmap.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use {
    bit_vec::BitVec,
    std::{cmp, iter, marker::PhantomData, ops},
};

/// Types that are dense integer indices (variables, literals)
pub trait AsIndex: Copy {
    fn as_index(self) -> usize;
    fn from_index(index: usize) -> Self;
}

/// A map from a dense index type to values, backed by a vector.
#[derive(Debug, Clone)]
pub struct IntMap<K: AsIndex, V> {
    map: Vec<V>,
    _marker: PhantomData<fn(K)>, // contravariance
}

impl<K: AsIndex, V> Default for IntMap<K, V> {
    fn default() -> Self {
        Self {
            map: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<K: AsIndex, V> IntMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn has(&self, k: K) -> bool {
        k.as_index() < self.map.len()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn reserve(&mut self, key: K, pad: V)
    where
        V: Clone,
    {
        let index = key.as_index();
        if index >= self.map.len() {
            self.map.resize(index + 1, pad);
        }
    }

    pub fn reserve_default(&mut self, key: K)
    where
        V: Default,
    {
        let index = key.as_index();
        if index >= self.map.len() {
            let len = index + 1 - self.map.len();
            self.map.extend((0..len).map(|_| V::default()));
        }
    }

    /// Clear content, keep internal buffers. Does not allocate.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn iter(&self) -> impl iter::Iterator<Item = (K, &V)> {
        self.map
            .iter()
            .enumerate()
            .map(|(k, v)| (K::from_index(k), v))
    }

    pub fn iter_mut(&mut self) -> impl iter::Iterator<Item = (K, &mut V)> {
        self.map
            .iter_mut()
            .enumerate()
            .map(|(k, v)| (K::from_index(k), v))
    }
}

impl<K: AsIndex, V> ops::Index<K> for IntMap<K, V> {
    type Output = V;
    #[inline]
    fn index(&self, index: K) -> &Self::Output {
        &self.map[index.as_index()]
    }
}

impl<K: AsIndex, V> ops::IndexMut<K> for IntMap<K, V> {
    #[inline]
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        &mut self.map[index.as_index()]
    }
}

/// A compact `K -> bool` map.
#[derive(Debug, Clone)]
pub struct IntMapBool<K: AsIndex> {
    map: BitVec,
    _marker: PhantomData<fn(K)>, // contravariance
}

impl<K: AsIndex> Default for IntMapBool<K> {
    fn default() -> Self {
        IntMapBool::new()
    }
}

impl<K: AsIndex> ops::Index<K> for IntMapBool<K> {
    type Output = bool;
    #[inline]
    fn index(&self, index: K) -> &Self::Output {
        if self.map.get(index.as_index()).unwrap_or(false) {
            &true
        } else {
            &false
        }
    }
}

impl<K: AsIndex> IntMapBool<K> {
    pub fn new() -> Self {
        Self {
            map: BitVec::new(),
            _marker: PhantomData,
        }
    }

    /// A map able to hold keys up to `len - 1`, all `false`.
    pub fn with_len(len: usize) -> Self {
        Self {
            map: BitVec::from_elem(len, false),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn has(&self, k: K) -> bool {
        k.as_index() < self.map.len()
    }

    #[inline]
    pub fn set(&mut self, k: K, b: bool) {
        self.map.set(k.as_index(), b);
    }

    pub fn reserve(&mut self, key: K) {
        let index = key.as_index();
        let len = self.map.len();
        if index >= len {
            self.map.grow(index - len + 1, false);
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    #[inline]
    pub fn insert(&mut self, key: K) {
        self.reserve(key);
        self.map.set(key.as_index(), true);
    }
}

/// A set of keys that remembers insertion order and can be cleared in
/// time proportional to its size.
#[derive(Debug, Clone)]
pub struct IntSet<K: AsIndex> {
    in_set: IntMapBool<K>,
    xs: Vec<K>,
}

impl<K: AsIndex> Default for IntSet<K> {
    fn default() -> Self {
        Self {
            in_set: IntMapBool::default(),
            xs: vec![],
        }
    }
}

impl<K: AsIndex> IntSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn clear(&mut self) {
        for &k in &self.xs {
            self.in_set.set(k, false);
        }
        self.xs.clear()
    }

    pub fn as_slice(&self) -> &[K] {
        &self.xs
    }

    /// Insert `k`, returns `true` if it was not present.
    pub fn insert(&mut self, k: K) -> bool {
        self.in_set.reserve(k);
        if self.in_set[k] {
            false
        } else {
            self.in_set.set(k, true);
            self.xs.push(k);
            true
        }
    }

    #[inline]
    pub fn has(&self, k: K) -> bool {
        self.in_set[k]
    }
}

impl<K: AsIndex> ops::Deref for IntSet<K> {
    type Target = [K];
    fn deref(&self) -> &Self::Target {
        &self.xs
    }
}

/// Total order used by a `Heap`; the smallest element is popped first.
pub trait Comparator<T: ?Sized> {
    fn cmp(&self, lhs: &T, rhs: &T) -> cmp::Ordering;

    #[inline]
    fn lt(&self, lhs: &T, rhs: &T) -> bool {
        self.cmp(lhs, rhs) == cmp::Ordering::Less
    }
}

/// Storage for a binary heap of keys, with position tracking.
#[derive(Debug, Clone)]
pub struct HeapData<K: AsIndex> {
    heap: Vec<K>,
    indices: IntMap<K, i32>,
}

impl<K: AsIndex> Default for HeapData<K> {
    fn default() -> Self {
        Self {
            heap: Vec::new(),
            indices: IntMap::new(),
        }
    }
}

impl<K: AsIndex> HeapData<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn in_heap(&self, k: K) -> bool {
        self.indices.has(k) && self.indices[k] >= 0
    }

    /// Pair the data with a comparator to obtain a usable heap
    pub fn promote<Comp: Comparator<K>>(&mut self, comp: Comp) -> Heap<K, Comp> {
        Heap { data: self, comp }
    }
}

#[derive(Debug)]
pub struct Heap<'a, K: AsIndex + 'a, Comp: Comparator<K>> {
    data: &'a mut HeapData<K>,
    comp: Comp,
}

impl<'a, K: AsIndex + 'a, Comp: Comparator<K>> ops::Deref for Heap<'a, K, Comp> {
    type Target = HeapData<K>;
    fn deref(&self) -> &Self::Target {
        self.data
    }
}

impl<'a, K: AsIndex + 'a, Comp: Comparator<K>> Heap<'a, K, Comp> {
    fn percolate_up(&mut self, mut i: usize) {
        let heap = &mut self.data.heap;
        let x = heap[i];
        while i != 0 {
            let p = (i - 1) >> 1;
            if !self.comp.lt(&x, &heap[p]) {
                break;
            }
            heap[i] = heap[p];
            self.data.indices[heap[i]] = i as i32;
            i = p;
        }
        heap[i] = x;
        self.data.indices[x] = i as i32;
    }

    fn percolate_down(&mut self, mut i: usize) {
        let heap = &mut self.data.heap;
        let x = heap[i];
        loop {
            let left = 2 * i + 1;
            if left >= heap.len() {
                break;
            }
            let right = left + 1;
            let child = if right < heap.len() && self.comp.lt(&heap[right], &heap[left]) {
                right
            } else {
                left
            };
            if !self.comp.lt(&heap[child], &x) {
                break;
            }
            heap[i] = heap[child];
            self.data.indices[heap[i]] = i as i32;
            i = child;
        }
        heap[i] = x;
        self.data.indices[x] = i as i32;
    }

    pub fn insert(&mut self, k: K) {
        self.data.indices.reserve(k, -1);
        debug_assert!(!self.in_heap(k));
        let i = self.data.heap.len();
        self.data.indices[k] = i as i32;
        self.data.heap.push(k);
        self.percolate_up(i);
    }

    /// Remove and return the smallest element, if any.
    pub fn pop_min(&mut self) -> Option<K> {
        let x = *self.data.heap.first()?;
        let last = self.data.heap.pop()?;
        self.data.indices[x] = -1;
        if !self.data.heap.is_empty() {
            self.data.heap[0] = last;
            self.data.indices[last] = 0;
            self.percolate_down(0);
        }
        Some(x)
    }

    /// Rebuild the heap from scratch, using the elements in `ns`
    pub fn build(&mut self, ns: &[K]) {
        self.clear();
        for (i, &x) in ns.iter().enumerate() {
            self.data.indices.reserve(x, -1);
            self.data.indices[x] = i as i32;
            self.data.heap.push(x);
        }
        for i in (0..self.data.heap.len() / 2).rev() {
            self.percolate_down(i);
        }
    }

    pub fn clear(&mut self) {
        let data = &mut self.data;
        for &x in &data.heap {
            data.indices[x] = -1;
        }
        data.heap.clear();
    }
}
