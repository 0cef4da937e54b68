//! 固定量ローテーション実装
//!
//! シーザー暗号と同じ考え方で、各単位の値を鍵の分だけずらす。
//! 逆変換は符号を反転した鍵で同じ [`rotate`] を呼ぶだけ。

use alloc::string::String;

use crate::error::CipherError;
use crate::{
    index_to_scalar, rotate, scalar_to_index, Transform, BYTE_MODULUS, DEFAULT_KEY,
    SCALAR_MODULUS,
};

/// 固定量ローテーション変換
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    key: i32,
}

impl Rotation {
    /// 鍵からローテーションを生成する
    ///
    /// # エラー
    /// - `CipherError::IdentityKey`: 鍵が 256 の倍数（0 を含む）
    pub fn new(key: i32) -> Result<Self, CipherError> {
        if key.rem_euclid(BYTE_MODULUS as i32) == 0 {
            return Err(CipherError::IdentityKey(key));
        }
        Ok(Rotation { key })
    }

    /// 鍵を返す
    pub fn key(&self) -> i32 {
        self.key
    }

    fn shift_char(c: char, shift: i64) -> char {
        let index = rotate(scalar_to_index(c), shift, SCALAR_MODULUS);
        // rotate の結果は必ず SCALAR_MODULUS 未満
        index_to_scalar(index).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn shift_line(line: &str, shift: i64) -> String {
        line.chars().map(|c| Self::shift_char(c, shift)).collect()
    }

    fn shift_byte(byte: u8, shift: i64) -> u8 {
        rotate(u32::from(byte), shift, BYTE_MODULUS) as u8
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation { key: DEFAULT_KEY }
    }
}

impl Transform for Rotation {
    fn apply_line(&self, line: &str) -> String {
        Self::shift_line(line, i64::from(self.key))
    }

    fn invert_line(&self, line: &str) -> String {
        Self::shift_line(line, -i64::from(self.key))
    }

    fn apply_byte(&self, byte: u8) -> u8 {
        Self::shift_byte(byte, i64::from(self.key))
    }

    fn invert_byte(&self, byte: u8) -> u8 {
        Self::shift_byte(byte, -i64::from(self.key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn make_rotation() -> Rotation {
        Rotation::default()
    }

    #[test]
    fn test_default_key_is_ten() {
        assert_eq!(make_rotation().key(), 10);
    }

    #[test]
    fn test_ascii_line_shifts_by_key() {
        let rot = make_rotation();
        assert_eq!(rot.apply_line("abc"), "klm");
        assert_eq!(rot.apply_line("(end)"), "2oxn3");
        assert_eq!(rot.invert_line("klm"), "abc");
    }

    #[test]
    fn test_line_roundtrip_multilingual() {
        let rot = make_rotation();
        let lines = [
            "",
            "Welcome! What would you like to do?",
            " /000000\\ ",
            "こんにちは、世界",
            "emoji 🦀 and accents éèà",
        ];
        for line in lines {
            let wire = rot.apply_line(line);
            assert_eq!(rot.invert_line(&wire), line, "行 {:?} の往復が一致しない", line);
        }
    }

    #[test]
    fn test_line_wraps_at_scalar_boundaries() {
        let rot = make_rotation();

        // 最大スカラー値は先頭に回り込む
        let top = alloc::format!("{}", char::MAX);
        let wire = rot.apply_line(&top);
        assert_eq!(wire, "\u{9}");
        assert_eq!(rot.invert_line(&wire), top);

        // サロゲート直前の値はサロゲートを飛び越える
        let below = "\u{D7FF}";
        let wire = rot.apply_line(below);
        assert_eq!(wire, "\u{E009}");
        assert_eq!(rot.invert_line(&wire), below);
    }

    #[test]
    fn test_byte_roundtrip_all_values() {
        let rot = make_rotation();
        for v in 0..=u8::MAX {
            assert_eq!(rot.invert_byte(rot.apply_byte(v)), v, "バイト {} の往復が一致しない", v);
        }
    }

    #[test]
    fn test_byte_wrap_boundary() {
        let rot = make_rotation();
        assert_eq!(rot.apply_byte(0xFF), 0x09);
        assert_eq!(rot.apply_byte(0xF6), 0x00);
        assert_eq!(rot.invert_byte(0x00), 0xF6);
        assert_eq!(rot.invert_byte(0x09), 0xFF);
    }

    #[test]
    fn test_bytes_in_place_roundtrip() {
        let rot = make_rotation();
        let original: Vec<u8> = (0u8..=255).collect();
        let mut data = original.clone();

        rot.apply_bytes(&mut data);
        assert_ne!(data, original);
        rot.invert_bytes(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn test_negative_key_is_inverse_of_positive() {
        let forward = Rotation::new(10).unwrap();
        let backward = Rotation::new(-10).unwrap();
        assert_eq!(backward.apply_line(&forward.apply_line("pairchat")), "pairchat");
        assert_eq!(backward.apply_byte(forward.apply_byte(0x80)), 0x80);
    }

    #[test]
    fn test_identity_key_rejected() {
        assert_eq!(Rotation::new(0), Err(CipherError::IdentityKey(0)));
        assert_eq!(Rotation::new(512), Err(CipherError::IdentityKey(512)));
        assert!(Rotation::new(266).is_ok());
    }
}
