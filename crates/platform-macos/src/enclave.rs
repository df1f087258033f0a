//! Secure Enclave presence probe.
//!
//! Presence is established by asking Security.framework for an ephemeral
//! P-256 key bound to the Secure Enclave token. Native error codes stop at
//! this module; callers only see `KeyProbeOutcome::indicates_enclave`.

use posture::{ChipStatus, ChipType, CommandRunner, Result};

use crate::{is_apple_silicon, PLATFORM};

/// `errSecUnimplemented`: the token does not exist on this machine.
pub const ERR_SEC_UNIMPLEMENTED: i64 = -4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyProbeOutcome {
    Created,
    Failed { code: i64 },
    AccessControlUnavailable,
    Unsupported,
}

impl KeyProbeOutcome {
    /// Any failure other than "unimplemented" still proves the token exists.
    pub fn indicates_enclave(&self) -> bool {
        match self {
            Self::Created => true,
            Self::Failed { code } => *code != ERR_SEC_UNIMPLEMENTED,
            Self::AccessControlUnavailable | Self::Unsupported => false,
        }
    }
}

pub trait SecureEnclaveProbe: Send + Sync {
    fn create_ephemeral_key(&self) -> KeyProbeOutcome;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSecureEnclave;

impl SecureEnclaveProbe for NativeSecureEnclave {
    fn create_ephemeral_key(&self) -> KeyProbeOutcome {
        #[cfg(target_os = "macos")]
        {
            // SAFETY: every CF object created in `probe_key` is released
            // before it returns and no pointer escapes.
            unsafe { ffi::probe_key() }
        }
        #[cfg(not(target_os = "macos"))]
        {
            tracing::warn!("create_ephemeral_key is a stub on non-macOS");
            KeyProbeOutcome::Unsupported
        }
    }
}

pub(crate) fn detect(
    runner: &dyn CommandRunner,
    enclave: &dyn SecureEnclaveProbe,
) -> Result<ChipStatus> {
    if is_apple_silicon(runner) {
        return Ok(ChipStatus::secure_enclave(PLATFORM, ChipType::SecureEnclave));
    }
    let outcome = enclave.create_ephemeral_key();
    tracing::debug!(?outcome, "secure enclave key probe");
    if outcome.indicates_enclave() {
        Ok(ChipStatus::secure_enclave(PLATFORM, ChipType::SecureEnclaveT2))
    } else {
        Ok(ChipStatus::absent(PLATFORM))
    }
}

#[cfg(target_os = "macos")]
mod ffi {
    use std::ptr;

    use libc::{c_long, c_ulong, c_void};

    use super::KeyProbeOutcome;

    type CFTypeRef = *const c_void;
    type CFAllocatorRef = *const c_void;
    type CFDictionaryRef = *const c_void;
    type CFStringRef = *const c_void;
    type CFErrorRef = *mut c_void;
    type CFIndex = c_long;
    type CFOptionFlags = c_ulong;

    #[repr(C)]
    struct CFDictionaryKeyCallBacks {
        _opaque: [u8; 0],
    }

    #[repr(C)]
    struct CFDictionaryValueCallBacks {
        _opaque: [u8; 0],
    }

    const K_CF_NUMBER_SINT32_TYPE: CFIndex = 3;
    const K_SEC_ACCESS_CONTROL_PRIVATE_KEY_USAGE: CFOptionFlags = 1 << 30;

    #[link(name = "CoreFoundation", kind = "framework")]
    extern "C" {
        static kCFAllocatorDefault: CFAllocatorRef;
        static kCFBooleanFalse: CFTypeRef;
        static kCFTypeDictionaryKeyCallBacks: CFDictionaryKeyCallBacks;
        static kCFTypeDictionaryValueCallBacks: CFDictionaryValueCallBacks;

        fn CFDictionaryCreate(
            allocator: CFAllocatorRef,
            keys: *const CFTypeRef,
            values: *const CFTypeRef,
            num_values: CFIndex,
            key_callbacks: *const CFDictionaryKeyCallBacks,
            value_callbacks: *const CFDictionaryValueCallBacks,
        ) -> CFDictionaryRef;
        fn CFNumberCreate(
            allocator: CFAllocatorRef,
            the_type: CFIndex,
            value_ptr: *const c_void,
        ) -> CFTypeRef;
        fn CFErrorGetCode(err: CFErrorRef) -> CFIndex;
        fn CFRelease(cf: CFTypeRef);
    }

    #[link(name = "Security", kind = "framework")]
    extern "C" {
        static kSecAttrKeyType: CFStringRef;
        static kSecAttrKeyTypeECSECPrimeRandom: CFStringRef;
        static kSecAttrKeySizeInBits: CFStringRef;
        static kSecAttrTokenID: CFStringRef;
        static kSecAttrTokenIDSecureEnclave: CFStringRef;
        static kSecPrivateKeyAttrs: CFStringRef;
        static kSecAttrIsPermanent: CFStringRef;
        static kSecAttrAccessControl: CFStringRef;
        static kSecAttrAccessibleWhenUnlockedThisDeviceOnly: CFStringRef;

        fn SecAccessControlCreateWithFlags(
            allocator: CFAllocatorRef,
            protection: CFTypeRef,
            flags: CFOptionFlags,
            error: *mut CFErrorRef,
        ) -> CFTypeRef;
        fn SecKeyCreateRandomKey(parameters: CFDictionaryRef, error: *mut CFErrorRef) -> CFTypeRef;
    }

    unsafe fn release(cf: CFTypeRef) {
        if !cf.is_null() {
            CFRelease(cf);
        }
    }

    unsafe fn dictionary(keys: &[CFTypeRef], values: &[CFTypeRef]) -> CFDictionaryRef {
        CFDictionaryCreate(
            kCFAllocatorDefault,
            keys.as_ptr(),
            values.as_ptr(),
            keys.len() as CFIndex,
            &kCFTypeDictionaryKeyCallBacks,
            &kCFTypeDictionaryValueCallBacks,
        )
    }

    pub(super) unsafe fn probe_key() -> KeyProbeOutcome {
        let access = SecAccessControlCreateWithFlags(
            kCFAllocatorDefault,
            kSecAttrAccessibleWhenUnlockedThisDeviceOnly,
            K_SEC_ACCESS_CONTROL_PRIVATE_KEY_USAGE,
            ptr::null_mut(),
        );
        if access.is_null() {
            return KeyProbeOutcome::AccessControlUnavailable;
        }

        let key_bits: i32 = 256;
        let key_size = CFNumberCreate(
            kCFAllocatorDefault,
            K_CF_NUMBER_SINT32_TYPE,
            &key_bits as *const i32 as *const c_void,
        );
        let private_attrs = dictionary(
            &[kSecAttrIsPermanent, kSecAttrAccessControl],
            &[kCFBooleanFalse, access],
        );
        let attrs = dictionary(
            &[
                kSecAttrKeyType,
                kSecAttrKeySizeInBits,
                kSecAttrTokenID,
                kSecPrivateKeyAttrs,
            ],
            &[
                kSecAttrKeyTypeECSECPrimeRandom,
                key_size,
                kSecAttrTokenIDSecureEnclave,
                private_attrs,
            ],
        );

        let outcome = if key_size.is_null() || private_attrs.is_null() || attrs.is_null() {
            KeyProbeOutcome::AccessControlUnavailable
        } else {
            let mut error: CFErrorRef = ptr::null_mut();
            let key = SecKeyCreateRandomKey(attrs, &mut error);
            if !key.is_null() {
                release(key);
                KeyProbeOutcome::Created
            } else if !error.is_null() {
                let code = i64::from(CFErrorGetCode(error));
                release(error as CFTypeRef);
                KeyProbeOutcome::Failed { code }
            } else {
                KeyProbeOutcome::Failed {
                    code: super::ERR_SEC_UNIMPLEMENTED,
                }
            }
        };

        release(attrs);
        release(private_attrs);
        release(key_size);
        release(access);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unimplemented_means_absent() {
        assert!(KeyProbeOutcome::Created.indicates_enclave());
        assert!(KeyProbeOutcome::Failed { code: -25293 }.indicates_enclave());
        assert!(KeyProbeOutcome::Failed { code: -34018 }.indicates_enclave());
        assert!(!KeyProbeOutcome::Failed {
            code: ERR_SEC_UNIMPLEMENTED
        }
        .indicates_enclave());
        assert!(!KeyProbeOutcome::AccessControlUnavailable.indicates_enclave());
        assert!(!KeyProbeOutcome::Unsupported.indicates_enclave());
    }
}
