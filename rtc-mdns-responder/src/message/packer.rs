use shared::error::*;

// Packing and unpacking primitives shared by the message types. All unpack
// helpers return the value and the offset one past the consumed bytes.

pub(crate) fn pack_uint16(mut msg: Vec<u8>, field: u16) -> Vec<u8> {
    msg.extend_from_slice(&field.to_be_bytes());
    msg
}

pub(crate) fn unpack_uint16(msg: &[u8], off: usize) -> Result<(u16, usize)> {
    if off + 2 > msg.len() {
        return Err(Error::ErrBaseLen);
    }
    Ok((u16::from_be_bytes([msg[off], msg[off + 1]]), off + 2))
}

pub(crate) fn skip_uint16(msg: &[u8], off: usize) -> Result<usize> {
    if off + 2 > msg.len() {
        return Err(Error::ErrBaseLen);
    }
    Ok(off + 2)
}

pub(crate) fn pack_uint32(mut msg: Vec<u8>, field: u32) -> Vec<u8> {
    msg.extend_from_slice(&field.to_be_bytes());
    msg
}

pub(crate) fn unpack_uint32(msg: &[u8], off: usize) -> Result<(u32, usize)> {
    if off + 4 > msg.len() {
        return Err(Error::ErrBaseLen);
    }
    let v = u32::from_be_bytes([msg[off], msg[off + 1], msg[off + 2], msg[off + 3]]);
    Ok((v, off + 4))
}

pub(crate) fn skip_uint32(msg: &[u8], off: usize) -> Result<usize> {
    if off + 4 > msg.len() {
        return Err(Error::ErrBaseLen);
    }
    Ok(off + 4)
}

pub(crate) fn pack_bytes(mut msg: Vec<u8>, field: &[u8]) -> Vec<u8> {
    msg.extend_from_slice(field);
    msg
}

pub(crate) fn unpack_bytes(msg: &[u8], off: usize, field: &mut [u8]) -> Result<usize> {
    let new_off = off + field.len();
    if new_off > msg.len() {
        return Err(Error::ErrBaseLen);
    }
    field.copy_from_slice(&msg[off..new_off]);
    Ok(new_off)
}

// A character-string is a single length octet followed by that many bytes.
pub(crate) fn pack_str(mut msg: Vec<u8>, field: &[u8]) -> Result<Vec<u8>> {
    if field.len() > 255 {
        return Err(Error::ErrSegTooLong);
    }
    msg.push(field.len() as u8);
    msg.extend_from_slice(field);
    Ok(msg)
}

pub(crate) fn unpack_str(msg: &[u8], off: usize) -> Result<(Vec<u8>, usize)> {
    if off >= msg.len() {
        return Err(Error::ErrBaseLen);
    }
    let begin = off + 1;
    let end = begin + msg[off] as usize;
    if end > msg.len() {
        return Err(Error::ErrCalcLen);
    }
    Ok((msg[begin..end].to_vec(), end))
}
