use std::cell::RefCell;
use std::collections::VecDeque;

/// Virtual key code as delivered by `WM_KEYDOWN` / `WM_KEYUP`.
pub type KeyCode = u8;

pub mod keys {
    use super::KeyCode;

    pub const VK_ESCAPE: KeyCode = 0x1B;
    pub const VK_UP: KeyCode = 0x26;
    pub const VK_DOWN: KeyCode = 0x28;
    pub const VK_OEM_PLUS: KeyCode = 0xBB;
    pub const VK_OEM_MINUS: KeyCode = 0xBD;
    pub const VK_ADD: KeyCode = 0x6B;
    pub const VK_SUBTRACT: KeyCode = 0x6D;
    pub const VK_OEM_4: KeyCode = 0xDB; // [
    pub const VK_OEM_6: KeyCode = 0xDD; // ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(KeyCode),
    Up(KeyCode),
}

/// Filled by the window procedure, drained by the frame loop.
///
/// The window procedure only ever sees this queue through a shared reference
/// stored in the window's user data, so it never aliases the demo itself.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: RefCell<VecDeque<KeyEvent>>,
}

impl InputQueue {
    pub fn push(&self, event: KeyEvent) {
        self.events.borrow_mut().push_back(event);
    }

    pub fn drain(&self) -> Vec<KeyEvent> {
        self.events.borrow_mut().drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_arrival_order() {
        let queue = InputQueue::default();
        queue.push(KeyEvent::Down(b'F'));
        queue.push(KeyEvent::Up(b'F'));
        queue.push(KeyEvent::Down(keys::VK_UP));
        assert_eq!(
            queue.drain(),
            vec![
                KeyEvent::Down(b'F'),
                KeyEvent::Up(b'F'),
                KeyEvent::Down(keys::VK_UP)
            ]
        );
        assert!(queue.drain().is_empty());
    }
}
