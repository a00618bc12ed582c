//! MP4 / ISO-BMFF container handler.
//!
//! Grounded on `uitsMP4Manager.c`'s `mp4ReadAtomHeader`/`mp4FindAtomHeader`
//! atom-walk shape (`examples/original_source/source/uitsMP4Manager.c`).
//! The `stco` chunk-offset fixup in [`embed`] has no source-side
//! precedent — the original embed path never patched `stco` — and is
//! implemented fresh from spec.md §4.1.2's redesign, per DESIGN.md.

use crate::crypto::sha256_bytes;
use crate::err::{UitsError, UitsResult};

const HEADER_LEN: u64 = 8;

#[derive(Clone, Copy, Debug)]
struct Atom {
    kind: [u8; 4],
    start: u64,
    body_start: u64,
    end: u64,
}

fn read_atom_header(data: &[u8], pos: u64) -> UitsResult<Atom> {
    let pos_usize = pos as usize;
    if pos_usize + 8 > data.len() {
        return Err(UitsError::Mp4("truncated atom header".into()));
    }

    let size = u32::from_be_bytes(data[pos_usize..pos_usize + 4].try_into().unwrap()) as u64;
    let kind: [u8; 4] = data[pos_usize + 4..pos_usize + 8].try_into().unwrap();

    if size == 1 {
        return Err(UitsError::Mp4(
            "64-bit extended-size atoms are not supported".into(),
        ));
    }

    let end = if size == 0 { data.len() as u64 } else { pos + size };

    if end > data.len() as u64 || end < pos + HEADER_LEN {
        return Err(UitsError::Mp4("atom size runs past end of file".into()));
    }

    Ok(Atom {
        kind,
        start: pos,
        body_start: pos + HEADER_LEN,
        end,
    })
}

fn children(data: &[u8], start: u64, end: u64) -> UitsResult<Vec<Atom>> {
    let mut atoms = Vec::new();
    let mut pos = start;

    while pos < end {
        let atom = read_atom_header(data, pos)?;
        pos = atom.end;
        atoms.push(atom);
    }

    Ok(atoms)
}

fn find<'a>(atoms: &'a [Atom], kind: &[u8; 4]) -> Option<&'a Atom> {
    atoms.iter().find(|a| &a.kind == kind)
}

/// Fails up front if any `co64` (64-bit chunk-offset table) atom exists
/// anywhere in the file: embedding would shift `stco`-style offsets but this
/// port never patches the 64-bit table, so such files must be rejected
/// rather than silently corrupted.
fn reject_co64(data: &[u8]) -> UitsResult<()> {
    fn walk(data: &[u8], start: u64, end: u64) -> UitsResult<()> {
        for atom in children(data, start, end)? {
            if &atom.kind == b"co64" {
                return Err(UitsError::Mp4(
                    "file uses 64-bit chunk offsets (co64), which this port cannot fix up".into(),
                ));
            }
            // mdat's "body" can contain arbitrary sample bytes that happen to
            // look like atom headers; only descend into container atoms.
            if is_container_kind(&atom.kind) {
                walk(data, atom.body_start, atom.end)?;
            }
        }
        Ok(())
    }

    walk(data, 0, data.len() as u64)
}

fn is_container_kind(kind: &[u8; 4]) -> bool {
    matches!(kind, b"moov" | b"trak" | b"mdia" | b"minf" | b"stbl" | b"udta")
}

pub fn is_valid(data: &[u8]) -> UitsResult<bool> {
    if data.len() < 8 {
        return Ok(false);
    }
    match read_atom_header(data, 0) {
        Ok(atom) => Ok(&atom.kind == b"ftyp"),
        Err(_) => Ok(false),
    }
}

pub fn media_hash(data: &[u8]) -> UitsResult<Vec<u8>> {
    let top = children(data, 0, data.len() as u64)?;
    let mdat = find(&top, b"mdat")
        .ok_or_else(|| UitsError::Mp4("no top-level mdat atom".into()))?;
    Ok(sha256_bytes(&data[mdat.body_start as usize..mdat.end as usize]))
}

fn find_udts_path(data: &[u8]) -> UitsResult<(Atom, Atom)> {
    let top = children(data, 0, data.len() as u64)?;
    let moov = find(&top, b"moov")
        .copied()
        .ok_or_else(|| UitsError::Mp4("no top-level moov atom".into()))?;
    let moov_children = children(data, moov.body_start, moov.end)?;
    let udta = find(&moov_children, b"udta")
        .copied()
        .ok_or_else(|| UitsError::Mp4("moov has no udta atom to extend".into()))?;
    Ok((moov, udta))
}

/// Inserts a `UITS` leaf atom at the head of `moov/udta`, per spec.md
/// §4.1.2's seven-step write sequence, then fixes up every `stco` entry in
/// the output by the number of bytes inserted.
pub fn embed(data: &[u8], token_xml: &str) -> UitsResult<Vec<u8>> {
    reject_co64(data)?;

    let (moov, udta) = find_udts_path(data)?;

    let udta_children = children(data, udta.body_start, udta.end)?;
    if find(&udta_children, b"UITS").is_some() {
        return Err(UitsError::Embed(
            "file already carries a moov/udta/UITS atom".into(),
        ));
    }

    let payload = token_xml.as_bytes();
    let inserted = HEADER_LEN + payload.len() as u64;

    let new_moov_size = (moov.end - moov.start) + inserted;
    let new_udta_size = (udta.end - udta.start) + inserted;

    let mut out = Vec::with_capacity(data.len() + inserted as usize);

    out.extend_from_slice(&data[0..moov.start as usize]);
    out.extend_from_slice(&(new_moov_size as u32).to_be_bytes());
    out.extend_from_slice(b"moov");
    out.extend_from_slice(&data[moov.body_start as usize..udta.start as usize]);
    out.extend_from_slice(&(new_udta_size as u32).to_be_bytes());
    out.extend_from_slice(b"udta");
    out.extend_from_slice(&(inserted as u32).to_be_bytes());
    out.extend_from_slice(b"UITS");
    out.extend_from_slice(payload);
    out.extend_from_slice(&data[udta.body_start as usize..]);

    fixup_stco(&mut out, inserted as u32)?;

    Ok(out)
}

/// Walks `moov/trak/mdia/minf/stbl/stco` in `data` and adds `delta` to every
/// chunk-offset entry, in place.
fn fixup_stco(data: &mut [u8], delta: u32) -> UitsResult<()> {
    let top = children(data, 0, data.len() as u64)?;
    let Some(moov) = find(&top, b"moov").copied() else {
        return Ok(());
    };

    for trak in children(data, moov.body_start, moov.end)?
        .into_iter()
        .filter(|a| &a.kind == b"trak")
    {
        let Some(stco) = descend(data, trak, &[b"mdia", b"minf", b"stbl", b"stco"])? else {
            continue;
        };

        let count_pos = stco.body_start as usize + 4;
        if count_pos + 4 > data.len() {
            return Err(UitsError::Mp4("truncated stco box".into()));
        }
        let count = u32::from_be_bytes(data[count_pos..count_pos + 4].try_into().unwrap());

        for i in 0..count {
            let entry_pos = count_pos + 4 + (i as usize) * 4;
            if entry_pos + 4 > data.len() {
                return Err(UitsError::Mp4("stco entry count exceeds box size".into()));
            }
            let current = u32::from_be_bytes(data[entry_pos..entry_pos + 4].try_into().unwrap());
            data[entry_pos..entry_pos + 4].copy_from_slice(&(current + delta).to_be_bytes());
        }
    }

    Ok(())
}

fn descend(data: &[u8], start: Atom, path: &[&[u8; 4]]) -> UitsResult<Option<Atom>> {
    let mut current = start;
    for kind in path {
        let kids = children(data, current.body_start, current.end)?;
        match find(&kids, kind) {
            Some(next) => current = *next,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

pub fn extract(data: &[u8]) -> UitsResult<Option<String>> {
    reject_co64(data)?;

    let top = children(data, 0, data.len() as u64)?;
    let Some(moov) = find(&top, b"moov").copied() else {
        return Ok(None);
    };

    let Some(uits) = descend(data, moov, &[b"udta", b"UITS"])? else {
        return Ok(None);
    };

    let body = &data[uits.body_start as usize..uits.end as usize];
    let text = String::from_utf8(body.to_vec())
        .map_err(|e| UitsError::Mp4(format!("embedded token is not valid UTF-8: {}", e)))?;
    Ok(Some(text))
}
