//! Tony runtime library.
//!
//! Provides the small set of I/O and string primitives that every compiled
//! Tony program links against: `puti`, `putb`, `putc`, `puts`, `geti`,
//! `getb`, `getc`, `gets`, `abs`, `ord`, `chr`, `strlen`, `strcmp`, `strcpy`,
//! `strcat`. This library is compiled as a static library (`staticlib`) and
//! linked together with the object code `tonyc` emits to produce the final
//! executable.
//!
//! `malloc`, which list-cell construction also depends on, is not defined
//! here — it is declared as an external symbol in the emitted module and
//! resolved straight from libc by the system linker.
//!
//! # ABI
//!
//! All exported functions use the C calling convention (`extern "C"`).
//! Tony's `char` is an 8-bit value; `char[]` is a raw, null-terminated byte
//! buffer exactly like a C string, so the string-taking functions below
//! work in terms of [`CStr`] the same way C's own `<string.h>` does.

use std::ffi::CStr;
use std::io::{self, BufReader, Read, Stdin, Write};
use std::os::raw::c_char;
use std::sync::{Mutex, OnceLock};

/// Converts a nullable C string pointer to `Option<&CStr>`.
///
/// # Safety
///
/// If `ptr` is non-null, it must point to a valid null-terminated C string.
unsafe fn cstr_from_nullable_ptr<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: The caller guarantees `ptr` is valid and null-terminated when non-null.
    Some(unsafe { CStr::from_ptr(ptr) })
}

fn write_bytes(bytes: &[u8]) {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(bytes);
    let _ = stdout.flush();
}

/// Prints a decimal integer with no trailing newline.
#[unsafe(no_mangle)]
pub extern "C" fn puti(n: i32) {
    write_bytes(n.to_string().as_bytes());
}

/// Prints `true` or `false` with no trailing newline.
#[unsafe(no_mangle)]
pub extern "C" fn putb(b: bool) {
    write_bytes(if b { b"true" } else { b"false" });
}

/// Prints a single raw byte.
#[unsafe(no_mangle)]
pub extern "C" fn putc(c: u8) {
    write_bytes(&[c]);
}

/// Prints a null-terminated string with no trailing newline and no escaping.
///
/// # Safety
///
/// The caller must ensure that `s` is a valid null-terminated byte buffer
/// (or null, in which case nothing is printed).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn puts(s: *const c_char) {
    // SAFETY: `puts` requires that a non-null pointer is a valid C string.
    if let Some(c_str) = unsafe { cstr_from_nullable_ptr(s) } {
        write_bytes(c_str.to_bytes());
    }
}

/// The stdin handle `geti`/`getb`/`getc`/`gets` share, so that tokens split
/// across calls are not lost to a fresh, unbuffered read each time.
fn stdin_reader() -> &'static Mutex<BufReader<Stdin>> {
    static READER: OnceLock<Mutex<BufReader<Stdin>>> = OnceLock::new();
    READER.get_or_init(|| Mutex::new(BufReader::new(io::stdin())))
}

/// Reads the next whitespace-delimited token from stdin, consuming (but not
/// returning) any leading whitespace. Returns an empty string at end of input.
fn read_token() -> String {
    let mut reader = stdin_reader().lock().expect("stdin reader poisoned");
    let mut token = String::new();
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                let c = byte[0] as char;
                if c.is_whitespace() {
                    if token.is_empty() {
                        continue;
                    }
                    break;
                }
                token.push(c);
            }
            Err(_) => break,
        }
    }
    token
}

/// Reads a whitespace-delimited integer. Malformed input reads as `0`.
#[unsafe(no_mangle)]
pub extern "C" fn geti() -> i32 {
    read_token().parse().unwrap_or(0)
}

/// Reads a whitespace-delimited boolean token; any spelling other than
/// `true` reads as `false`.
#[unsafe(no_mangle)]
pub extern "C" fn getb() -> bool {
    read_token() == "true"
}

/// Reads a single raw byte from stdin, with no whitespace skipping. Returns
/// `0` at end of input — Tony has no end-of-file sentinel character.
#[unsafe(no_mangle)]
pub extern "C" fn getc() -> u8 {
    let mut reader = stdin_reader().lock().expect("stdin reader poisoned");
    let mut byte = [0u8; 1];
    match reader.read(&mut byte) {
        Ok(1) => byte[0],
        _ => 0,
    }
}

/// Reads up to `n - 1` bytes of a single line into `s`, stopping at (and
/// discarding) the first newline or at end of input, then null-terminates.
/// Does nothing if `s` is null or `n` is not positive.
///
/// # Safety
///
/// The caller must ensure `s` points to a writable buffer of at least `n`
/// bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gets(n: i32, s: *mut c_char) {
    if s.is_null() || n <= 0 {
        return;
    }
    let capacity = (n - 1) as usize;
    let mut buf = Vec::with_capacity(capacity);
    {
        let mut reader = stdin_reader().lock().expect("stdin reader poisoned");
        let mut byte = [0u8; 1];
        while buf.len() < capacity {
            match reader.read(&mut byte) {
                Ok(0) => break,
                Ok(_) if byte[0] == b'\n' => break,
                Ok(_) => buf.push(byte[0] as c_char),
                Err(_) => break,
            }
        }
    }
    // SAFETY: caller guarantees `s` has room for at least `n` bytes, and
    // `buf.len() < n`, so writing `buf.len()` bytes plus a terminator fits.
    unsafe {
        std::ptr::copy_nonoverlapping(buf.as_ptr(), s, buf.len());
        *s.add(buf.len()) = 0;
    }
}

/// Absolute value. `i32::MIN` wraps to itself, matching two's-complement
/// `neg` rather than panicking.
#[unsafe(no_mangle)]
pub extern "C" fn abs(n: i32) -> i32 {
    n.wrapping_abs()
}

/// A character's ordinal value.
#[unsafe(no_mangle)]
pub extern "C" fn ord(c: u8) -> i32 {
    c as i32
}

/// The character with the given ordinal value, truncated to 8 bits.
#[unsafe(no_mangle)]
pub extern "C" fn chr(n: i32) -> u8 {
    n as u8
}

/// The length of a null-terminated string, not counting the terminator.
/// A null pointer has length `0`.
///
/// # Safety
///
/// `s` must be null or point to a valid null-terminated byte buffer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strlen(s: *const c_char) -> i32 {
    // SAFETY: `strlen` requires that a non-null pointer is a valid C string.
    match unsafe { cstr_from_nullable_ptr(s) } {
        Some(c_str) => c_str.to_bytes().len() as i32,
        None => 0,
    }
}

/// Lexicographic byte comparison, C-`strcmp` style: negative if `a < b`,
/// zero if equal, positive if `a > b`. A null pointer sorts before any
/// non-null string and is equal only to another null pointer.
///
/// # Safety
///
/// Both `a` and `b` must be null or point to a valid null-terminated byte
/// buffer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strcmp(a: *const c_char, b: *const c_char) -> i32 {
    if a == b {
        return 0;
    }
    // SAFETY: `strcmp` requires that non-null pointers are valid C strings.
    let a_str = unsafe { cstr_from_nullable_ptr(a) };
    // SAFETY: same as above.
    let b_str = unsafe { cstr_from_nullable_ptr(b) };
    match (a_str, b_str) {
        (None, None) => 0,
        (None, Some(_)) => -1,
        (Some(_), None) => 1,
        (Some(a), Some(b)) => match a.cmp(b) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        },
    }
}

/// Copies `src`, including its terminator, into `dst`. The caller is
/// responsible for `dst` having enough room; this is a direct C-`strcpy`
/// analogue and performs no bounds checking.
///
/// # Safety
///
/// `src` must point to a valid null-terminated byte buffer; `dst` must be
/// writable for at least `strlen(src) + 1` bytes. Does nothing if either
/// pointer is null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strcpy(dst: *mut c_char, src: *const c_char) {
    if dst.is_null() || src.is_null() {
        return;
    }
    // SAFETY: caller guarantees `src` is a valid C string and `dst` has room
    // for its full length, including the terminator.
    unsafe {
        let bytes = CStr::from_ptr(src).to_bytes_with_nul();
        std::ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, dst, bytes.len());
    }
}

/// Appends `src`, including its terminator, onto the end of `dst`. The
/// caller is responsible for `dst` having enough room beyond its current
/// contents; this is a direct C-`strcat` analogue and performs no bounds
/// checking.
///
/// # Safety
///
/// Both pointers must be null-terminated byte buffers when non-null; `dst`
/// must be writable for at least `strlen(dst) + strlen(src) + 1` bytes.
/// Does nothing if either pointer is null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn strcat(dst: *mut c_char, src: *const c_char) {
    if dst.is_null() || src.is_null() {
        return;
    }
    // SAFETY: caller guarantees both buffers are valid C strings and `dst`
    // has room for the concatenated result, including the terminator.
    unsafe {
        let dst_len = CStr::from_ptr(dst).to_bytes().len();
        let src_bytes = CStr::from_ptr(src).to_bytes_with_nul();
        std::ptr::copy_nonoverlapping(
            src_bytes.as_ptr() as *const c_char,
            dst.add(dst_len),
            src_bytes.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_puti_putb_putc_puts_do_not_panic() {
        puti(42);
        puti(-7);
        putb(true);
        putb(false);
        putc(b'x');
        let s = CString::new("Hello world!\n").unwrap();
        unsafe { puts(s.as_ptr()) };
        unsafe { puts(std::ptr::null()) };
    }

    #[test]
    fn test_abs() {
        assert_eq!(abs(5), 5);
        assert_eq!(abs(-5), 5);
        assert_eq!(abs(0), 0);
        assert_eq!(abs(i32::MIN), i32::MIN);
    }

    #[test]
    fn test_ord_chr_roundtrip() {
        assert_eq!(ord(b'A'), 65);
        assert_eq!(chr(65), b'A');
        assert_eq!(chr(ord(b'z') as i32), b'z');
    }

    #[test]
    fn test_strlen() {
        let s = CString::new("hello").unwrap();
        assert_eq!(unsafe { strlen(s.as_ptr()) }, 5);
        let empty = CString::new("").unwrap();
        assert_eq!(unsafe { strlen(empty.as_ptr()) }, 0);
        assert_eq!(unsafe { strlen(std::ptr::null()) }, 0);
    }

    #[test]
    fn test_strcmp() {
        let a = CString::new("abc").unwrap();
        let b = CString::new("abd").unwrap();
        let c = CString::new("abc").unwrap();
        assert!(unsafe { strcmp(a.as_ptr(), b.as_ptr()) } < 0);
        assert!(unsafe { strcmp(b.as_ptr(), a.as_ptr()) } > 0);
        assert_eq!(unsafe { strcmp(a.as_ptr(), c.as_ptr()) }, 0);
        assert_eq!(unsafe { strcmp(a.as_ptr(), a.as_ptr()) }, 0);
        assert_eq!(
            unsafe { strcmp(std::ptr::null(), std::ptr::null()) },
            0
        );
        assert!(unsafe { strcmp(std::ptr::null(), a.as_ptr()) } < 0);
    }

    #[test]
    fn test_strcpy_strcat() {
        let mut buf = [0u8; 16];
        let src = CString::new("abc").unwrap();
        unsafe { strcpy(buf.as_mut_ptr() as *mut c_char, src.as_ptr()) };
        assert_eq!(&buf[..4], b"abc\0");

        let suffix = CString::new("def").unwrap();
        unsafe { strcat(buf.as_mut_ptr() as *mut c_char, suffix.as_ptr()) };
        assert_eq!(&buf[..7], b"abcdef\0");
    }
}
