//! A capture-like record: a few scalars, a sample vector sized by a sibling
//! count and a list of small objects sized the same way.

use hdm_schema::HEADER_SENTINEL;

/// Header of the sample record.
pub const SAMPLE_HEADER: &str = "{
    'types': {
        'u8': {'type': 'int', 'size': 1, 'signed': False},
        'u32': {'type': 'int', 'size': 4, 'signed': False},
        'f32': {'type': 'float', 'size': 4},
        'f64': {'type': 'float', 'size': 8},
        'Units': {'type': 'enum', 'size': 1, 'values': ['RAW', 'VOLTS', 'DBM']},
        'Opts': {'type': 'flag', 'size': 1, 'values': ['CALIBRATED', 'CLIPPED']},
        'Samples': {'type': 'vector', 'base': 'f32'},
        'Marker': {'type': 'object', 'layout': [
            {'type': 'u32', 'field_names': ['index']},
            {'type': 'f64', 'field_names': ['level']},
        ]},
        'Markers': {'type': 'list', 'base': 'Marker'},
        'Capture': {'type': 'object', 'layout': [
            {'type': 'Units', 'field_names': ['units']},
            {'type': 'Opts', 'field_names': ['opts']},
            {'type': 'f64', 'field_names': ['scale'], 'condition': ('opts', 'CALIBRATED')},
            {'type': 'u32', 'field_names': ['n_samples']},
            {'type': 'Samples', 'field_names': ['samples'], 'size': 'n_samples'},
            {'type': 'u32', 'field_names': ['n_markers']},
            {'type': 'Markers', 'field_names': ['markers'], 'size': 'n_markers'},
        ]},
    },
    'message': {'type': 'Capture'},
}";

/// Builds a payload for [`SAMPLE_HEADER`] with the given element counts.
#[must_use]
pub fn sample_payload(samples: u32, markers: u32) -> Vec<u8> {
    let mut payload = vec![1u8, 0b01];
    payload.extend_from_slice(&0.5f64.to_le_bytes());

    payload.extend_from_slice(&samples.to_le_bytes());
    for i in 0..samples {
        payload.extend_from_slice(&((i % 64) as f32 * 0.25).to_le_bytes());
    }

    payload.extend_from_slice(&markers.to_le_bytes());
    for i in 0..markers {
        payload.extend_from_slice(&i.to_le_bytes());
        payload.extend_from_slice(&f64::from(i).to_le_bytes());
    }
    payload
}

/// Builds a complete file image: header, sentinel line, payload.
#[must_use]
pub fn sample_image(samples: u32, markers: u32) -> Vec<u8> {
    let mut image = SAMPLE_HEADER.as_bytes().to_vec();
    image.push(b'\n');
    image.extend_from_slice(HEADER_SENTINEL);
    image.extend(sample_payload(samples, markers));
    image
}
