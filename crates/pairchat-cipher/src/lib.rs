//! # pairchat-cipher
//!
//! ワイヤに載るすべての単位（テキスト行・1 バイト・バイト列）に適用する
//! 可逆なローテーション変換。
//!
//! **これは暗号ではない。** 公開された固定量のシフトによる難読化のプレースホルダで、
//! [`Transform`] トレイトの apply / invert 2 関数契約を満たせば差し替えられる。
//!
//! ## 単位ごとの法（modulus）
//!
//! ```text
//! テキスト行 : Unicode スカラー値ごとに回転
//!              法 = 1_112_064（サロゲート 0xD800..=0xDFFF を除いた密な添字空間）
//! 1 バイト   : 法 = 256（符号拡張なし、0xFF + 10 = 0x09）
//! バイト列   : 各バイトに 1 バイト変換を適用
//! ```
//!
//! 3 つの単位はすべて [`rotate`] を共有し、法だけが異なる。

#![no_std]
extern crate alloc;

mod error;
mod rotation;

pub use error::CipherError;
pub use rotation::Rotation;

use alloc::string::String;
use alloc::sync::Arc;

/// 既定のローテーション量
pub const DEFAULT_KEY: i32 = 10;

/// 1 バイト単位の法
pub const BYTE_MODULUS: u32 = 256;

/// テキスト行単位の法（Unicode スカラー値の総数）
pub const SCALAR_MODULUS: u32 = 0x11_0000 - SURROGATE_COUNT;

/// サロゲート領域の開始位置と個数
const SURROGATE_START: u32 = 0xD800;
const SURROGATE_COUNT: u32 = 0x800;

/// ワイヤ単位の可逆変換の契約
///
/// すべての単位 `u` について `invert(apply(u)) == u` を満たさなければならない。
pub trait Transform {
    /// テキスト行を変換する
    fn apply_line(&self, line: &str) -> String;

    /// [`Transform::apply_line`] の逆変換
    fn invert_line(&self, line: &str) -> String;

    /// 1 バイトを変換する
    fn apply_byte(&self, byte: u8) -> u8;

    /// [`Transform::apply_byte`] の逆変換
    fn invert_byte(&self, byte: u8) -> u8;

    /// バイト列をその場で変換する
    fn apply_bytes(&self, bytes: &mut [u8]) {
        for b in bytes.iter_mut() {
            *b = self.apply_byte(*b);
        }
    }

    /// [`Transform::apply_bytes`] の逆変換
    fn invert_bytes(&self, bytes: &mut [u8]) {
        for b in bytes.iter_mut() {
            *b = self.invert_byte(*b);
        }
    }
}

/// Framer とファイルチャネルで共有する変換
pub type SharedTransform = Arc<dyn Transform + Send + Sync>;

/// `value` を `shift` だけ回転する（法 `modulus`）
///
/// 負のシフトは逆方向の回転になる。結果は常に `0..modulus` に収まる。
pub fn rotate(value: u32, shift: i64, modulus: u32) -> u32 {
    let m = i64::from(modulus);
    (i64::from(value) + shift).rem_euclid(m) as u32
}

/// Unicode スカラー値を密な添字（サロゲートを詰めた空間）に写す
pub fn scalar_to_index(c: char) -> u32 {
    let v = c as u32;
    if v < SURROGATE_START {
        v
    } else {
        v - SURROGATE_COUNT
    }
}

/// [`scalar_to_index`] の逆写像
///
/// `index >= SCALAR_MODULUS` の場合は `None`。
pub fn index_to_scalar(index: u32) -> Option<char> {
    if index >= SCALAR_MODULUS {
        return None;
    }
    let v = if index < SURROGATE_START {
        index
    } else {
        index + SURROGATE_COUNT
    };
    char::from_u32(v)
}
