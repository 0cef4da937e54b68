//! 変換エラー型

/// ローテーション変換の構築エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// 鍵が 256 の倍数（1 バイト変換が恒等写像になる）
    IdentityKey(i32),
}

impl core::fmt::Display for CipherError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CipherError::IdentityKey(k) => {
                write!(f, "Rotation key {} is a multiple of 256 (byte transform would be the identity)", k)
            }
        }
    }
}

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "std")]
impl std::error::Error for CipherError {}
