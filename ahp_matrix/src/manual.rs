/*!

This is the long-form manual for `ahp_matrix` and `ahpsurvey`.

## Pairwise judgments

Each respondent compares every pair of criteria. For a pair (A, B), the respondent:
* selects which of A or B is more important
* gives an intensity of preference on the Saaty scale

| intensity | meaning                |
|-----------|------------------------|
| 1         | equal importance       |
| 3         | moderate importance    |
| 5         | strong importance      |
| 7         | very strong importance |
| 9         | extreme importance     |

The even values are intermediate intensities. A pair left blank keeps the neutral value 1.

## Consistency ratio

The consistency index is `CI = (lambda_max - n) / (n - 1)` where `lambda_max` is the largest
eigenvalue of the comparison matrix. The consistency ratio divides it by the random index of
the same size:

| n  | 1    | 2    | 3    | 4    | 5    | 6    | 7    | 8    | 9    | 10   |
|----|------|------|------|------|------|------|------|------|------|------|
| RI | 0.00 | 0.00 | 0.58 | 0.90 | 1.12 | 1.24 | 1.32 | 1.41 | 1.45 | 1.49 |

Above 10 criteria, the default table has no value and the evaluation fails. The `extended`
table adds the values 1.51, 1.48, 1.56, 1.57, 1.59 for 11 to 15 criteria.

A ratio below 0.10 is usually considered acceptable. The threshold is set in the survey rules.

## Input formats

The following formats are supported by `ahpsurvey`:
* `csv` the survey form, one row per respondent
* `xlsx` the same layout, in an Excel workbook
* `csv_pairs` one row per judgment

### `csv` and `xlsx`

The first row is a header. The name of the respondent is in the column `nameColumnIndex`
(1 by default). From the column `firstJudgmentColumnIndex` (2 by default), each pair of
criteria uses two columns: the name of the preferred criterion, and the intensity.
The pairs come in the order (1, 2), (1, 3), ..., (1, n), (2, 3), ..., (n - 1, n).

| name  | A vs B | intensity | A vs C | intensity | B vs C | intensity |
|-------|--------|-----------|--------|-----------|--------|-----------|
| Ana   | A      | 3         | C      | 5         |        |           |
| Luis  | A      | 2         | A      | 4         | B      | 2         |

A pair counts as answered when both cells are filled.

### `csv_pairs`

The first row is a header. The columns are: respondent, first criterion, second criterion,
preferred criterion, intensity.

```text
respondent,first,second,winner,intensity
Ana,A,B,A,3
Ana,A,C,C,5
```

The rows of one respondent do not need to be contiguous. If the same pair appears twice for
one respondent, the `duplicateJudgment` rule decides: `lastWins` (default) or `reject`.

## Configuration

```json
{
  "outputSettings": {
    "projectName": "Coffee suitability",
    "outputDirectory": "output",
    "storeDirectory": "store"
  },
  "criteria": [{ "name": "Climate" }, { "name": "Slope" }, { "name": "Soil" }],
  "responseSources": [{ "provider": "csv", "filePath": "responses.csv" }],
  "rules": { "consistencyThreshold": 0.1, "randomIndexTable": "saaty" }
}
```

*/
