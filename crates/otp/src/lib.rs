//! 一次性密碼（OTP）分段輸入的狀態機。 / State machine behind the segmented
//! one-time-password entry widget.
//!
//! The widget is a fixed row of single-digit slots with one focused slot.
//! Typing a digit fills the focused slot and advances, backspace retreats,
//! and pasting distributes a whole code across the slots. Rendering and
//! real clipboard access stay in the presentation layer.

use thiserror::Error;

/// 預設的驗證碼長度。 / Default number of digit slots.
pub const DEFAULT_LENGTH: usize = 6;

/// 分段驗證碼輸入的狀態。 / State of a segmented code entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpEntry {
    slots: Vec<Option<char>>,
    active: usize,
}

impl OtpEntry {
    /// 建立預設長度（六碼）的輸入狀態。 / Creates an entry with the default six slots.
    pub fn new() -> Self {
        Self {
            slots: vec![None; DEFAULT_LENGTH],
            active: 0,
        }
    }

    /// 建立自訂長度的輸入狀態；長度為零時回傳 `None`。 / Creates an entry with a
    /// custom slot count, rejecting zero.
    pub fn with_length(len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        Some(Self {
            slots: vec![None; len],
            active: 0,
        })
    }

    /// 槽位數量。 / Number of digit slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// 是否所有槽位皆為空。 / Whether no digit has been entered yet.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// 是否所有槽位皆已填入。 / Whether every slot holds a digit.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// 目前聚焦的槽位索引。 / Index of the focused slot.
    pub fn active(&self) -> usize {
        self.active
    }

    /// 聚焦指定槽位；超出範圍時夾限到最後一格。 / Focuses a slot, clamping to
    /// the last one when out of range.
    pub fn focus(&mut self, index: usize) {
        self.active = index.min(self.slots.len() - 1);
    }

    /// 所有槽位的內容。 / Contents of every slot.
    pub fn slots(&self) -> &[Option<char>] {
        &self.slots
    }

    /// 在聚焦槽位輸入一個字元；非數字會被忽略。填入後聚焦自動前進，
    /// 停在最後一格。 / Types one character into the focused slot. Non-digits
    /// are ignored; after a digit the focus advances, stopping at the last slot.
    pub fn type_digit(&mut self, c: char) -> bool {
        if !c.is_ascii_digit() {
            return false;
        }
        self.slots[self.active] = Some(c);
        if self.active < self.slots.len() - 1 {
            self.active += 1;
        }
        true
    }

    /// 退格：聚焦槽位有值時清除該值；為空時聚焦退回前一格。
    /// / Backspace: clears the focused slot when it holds a digit, otherwise
    /// retreats the focus one slot.
    pub fn clear_back(&mut self) {
        if self.slots[self.active].is_some() {
            self.slots[self.active] = None;
        } else if self.active > 0 {
            self.active -= 1;
        }
    }

    /// 貼上整組驗證碼。內容去除前後空白後必須全為數字，否則整次貼上
    /// 會被拒絕。最多取前 `len` 碼由第一格開始填入，其餘槽位清空；
    /// 聚焦移到最後填入的下一格（填滿時停在最後一格）。
    /// / Pastes a whole code. The trimmed text must be all digits or the
    /// paste is rejected. Up to `len` leading digits fill the slots from the
    /// start, the remaining slots are cleared, and the focus lands after the
    /// last filled slot (on the last slot when full).
    pub fn paste(&mut self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        let digits: Vec<char> = trimmed.chars().take(self.slots.len()).collect();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            *slot = digits.get(index).copied();
        }
        self.active = digits.len().min(self.slots.len() - 1);
        true
    }

    /// 所有槽位填滿時回傳完整驗證碼。 / The full code once every slot is filled.
    pub fn code(&self) -> Option<String> {
        self.slots.iter().copied().collect()
    }

    /// 送出驗證碼：成功時回傳完整驗證碼並清空所有槽位、聚焦第一格；
    /// 尚有空槽時回傳錯誤且狀態不變。 / Submits the code. On success the full
    /// code is returned and the entry resets (all slots cleared, first slot
    /// focused); with empty slots left, an error is returned and nothing changes.
    pub fn submit(&mut self) -> Result<String, OtpError> {
        match self.code() {
            Some(code) => {
                for slot in &mut self.slots {
                    *slot = None;
                }
                self.active = 0;
                Ok(code)
            }
            None => {
                let missing = self.slots.iter().filter(|slot| slot.is_none()).count();
                Err(OtpError::Incomplete { missing })
            }
        }
    }
}

impl Default for OtpEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// 驗證碼輸入的錯誤。 / Errors reported by the entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OtpError {
    #[error("{missing} digit slot(s) still empty")]
    Incomplete { missing: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(entry: &mut OtpEntry, text: &str) {
        for c in text.chars() {
            entry.type_digit(c);
        }
    }

    #[test]
    fn typing_fills_and_advances() {
        let mut entry = OtpEntry::new();
        assert!(entry.type_digit('4'));
        assert_eq!(entry.slots()[0], Some('4'));
        assert_eq!(entry.active(), 1);
    }

    #[test]
    fn non_digits_are_ignored() {
        let mut entry = OtpEntry::new();
        assert!(!entry.type_digit('x'));
        assert!(!entry.type_digit(' '));
        assert!(entry.is_empty());
        assert_eq!(entry.active(), 0);
    }

    #[test]
    fn focus_stops_at_the_last_slot() {
        let mut entry = OtpEntry::new();
        typed(&mut entry, "123456");
        assert_eq!(entry.active(), entry.len() - 1);
        // another digit overwrites the last slot instead of walking off
        entry.type_digit('9');
        assert_eq!(entry.slots()[5], Some('9'));
        assert_eq!(entry.active(), 5);
    }

    #[test]
    fn backspace_clears_then_retreats() {
        let mut entry = OtpEntry::new();
        typed(&mut entry, "12");
        entry.focus(2);
        entry.clear_back(); // slot 2 empty, retreat to slot 1
        assert_eq!(entry.active(), 1);
        entry.clear_back(); // slot 1 holds '2', clear in place
        assert_eq!(entry.slots()[1], None);
        assert_eq!(entry.active(), 1);
    }

    #[test]
    fn backspace_at_first_empty_slot_is_a_no_op() {
        let mut entry = OtpEntry::new();
        entry.clear_back();
        assert_eq!(entry.active(), 0);
        assert!(entry.is_empty());
    }

    #[test]
    fn paste_distributes_digits() {
        let mut entry = OtpEntry::new();
        assert!(entry.paste(" 123456 "));
        assert_eq!(entry.code().as_deref(), Some("123456"));
        assert_eq!(entry.active(), entry.len() - 1);
    }

    #[test]
    fn partial_paste_clears_the_tail() {
        let mut entry = OtpEntry::new();
        typed(&mut entry, "999999");
        assert!(entry.paste("123"));
        assert_eq!(entry.slots()[..3], [Some('1'), Some('2'), Some('3')]);
        assert!(entry.slots()[3..].iter().all(Option::is_none));
        assert_eq!(entry.active(), 3);
    }

    #[test]
    fn paste_rejects_non_numeric_text() {
        let mut entry = OtpEntry::new();
        typed(&mut entry, "12");
        assert!(!entry.paste("12a456"));
        assert!(!entry.paste(""));
        // a rejected paste leaves the entry untouched
        assert_eq!(entry.slots()[..2], [Some('1'), Some('2')]);
    }

    #[test]
    fn overlong_paste_keeps_the_leading_digits() {
        let mut entry = OtpEntry::new();
        assert!(entry.paste("123456789"));
        assert_eq!(entry.code().as_deref(), Some("123456"));
    }

    #[test]
    fn submit_requires_every_slot() {
        let mut entry = OtpEntry::new();
        typed(&mut entry, "123");
        assert_eq!(entry.submit(), Err(OtpError::Incomplete { missing: 3 }));
        // failed submit changes nothing
        assert_eq!(entry.active(), 3);
        assert_eq!(entry.slots()[0], Some('1'));
    }

    #[test]
    fn submit_returns_code_and_resets() {
        let mut entry = OtpEntry::new();
        typed(&mut entry, "031337");
        assert_eq!(entry.submit().as_deref(), Ok("031337"));
        assert!(entry.is_empty());
        assert_eq!(entry.active(), 0);
    }

    #[test]
    fn custom_lengths_work_and_zero_is_rejected() {
        assert!(OtpEntry::with_length(0).is_none());
        let mut entry = OtpEntry::with_length(4).expect("non-zero length");
        assert!(entry.paste("1234"));
        assert_eq!(entry.submit().as_deref(), Ok("1234"));
    }
}
